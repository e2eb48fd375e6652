use super::Primitive;


// strcmp(a: string, b: string): int, the sign orders a against b
inventory::submit! { Primitive { name: "strcmp", params: &["string", "string"], ret: Some("int") } }
