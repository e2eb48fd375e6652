use super::Primitive;


// chr(i: int): string
inventory::submit! { Primitive { name: "chr", params: &["int"], ret: Some("string") } }
