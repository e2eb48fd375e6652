use super::Primitive;


// substring(s: string, first: int, n: int): string
inventory::submit! { Primitive { name: "substring", params: &["string", "int", "int"], ret: Some("string") } }
