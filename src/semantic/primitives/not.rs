use super::Primitive;


// not(i: int): int
inventory::submit! { Primitive { name: "not", params: &["int"], ret: Some("int") } }
