pub mod suggestion_events;
