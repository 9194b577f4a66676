//! Real-time notifications
//!
//! Event bus + WebSocket fan-out to connected consoles, plus the push
//! dispatcher that forwards selected events to registered devices.

pub mod event_bus;
pub mod events;
pub mod push;
pub mod ws;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use events::{ChangeAction, Event, EventMessage};
pub use push::{LogPushGateway, PushDispatcher, PushGateway};
pub use ws::{create_notification_state, ws_notifications_handler, NotificationState};
