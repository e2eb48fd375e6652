use super::Primitive;


// getchar(): string, empty string at end of input
inventory::submit! { Primitive { name: "getchar", params: &[], ret: Some("string") } }
