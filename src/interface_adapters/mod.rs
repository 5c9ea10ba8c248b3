// Interface adapters: terminal presentation, keyboard input and run reports.

pub mod input;
pub mod report;
pub mod terminal;
