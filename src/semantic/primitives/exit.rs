use super::Primitive;


// exit(code: int)
inventory::submit! { Primitive { name: "exit", params: &["int"], ret: None } }
