pub mod address;
pub mod descriptor;
pub mod machine_type;
