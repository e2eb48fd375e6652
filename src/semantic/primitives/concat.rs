use super::Primitive;


// concat(a: string, b: string): string
inventory::submit! { Primitive { name: "concat", params: &["string", "string"], ret: Some("string") } }
