pub mod numbering_controller;
