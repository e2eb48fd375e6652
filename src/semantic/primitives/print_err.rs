use super::Primitive;


// print_err(s: string), writes to the error stream
inventory::submit! { Primitive { name: "print_err", params: &["string"], ret: None } }
