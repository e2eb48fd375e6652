use super::Primitive;


// flush()
inventory::submit! { Primitive { name: "flush", params: &[], ret: None } }
