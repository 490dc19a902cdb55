pub mod hosttech;
