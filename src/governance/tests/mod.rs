pub mod gate_tests;
