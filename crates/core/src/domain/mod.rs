pub mod entity;
pub mod intent;
pub mod playbook;
pub mod style;
