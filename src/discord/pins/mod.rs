pub mod pin_events;
