use super::Primitive;


// print(s: string)
inventory::submit! { Primitive { name: "print", params: &["string"], ret: None } }
