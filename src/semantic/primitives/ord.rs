use super::Primitive;


// ord(s: string): int, -1 for the empty string
inventory::submit! { Primitive { name: "ord", params: &["string"], ret: Some("int") } }
