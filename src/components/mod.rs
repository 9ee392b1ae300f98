pub mod palette_button;
