use super::Primitive;


// size(s: string): int
inventory::submit! { Primitive { name: "size", params: &["string"], ret: Some("int") } }
