pub mod order_commands;
