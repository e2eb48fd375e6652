use super::Primitive;


// streq(a: string, b: string): int
inventory::submit! { Primitive { name: "streq", params: &["string", "string"], ret: Some("int") } }
