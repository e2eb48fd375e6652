use super::Primitive;


// print_int(i: int)
inventory::submit! { Primitive { name: "print_int", params: &["int"], ret: None } }
