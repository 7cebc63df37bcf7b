pub mod cache;
pub mod engine;
pub mod input;
pub mod mutation;
pub mod resolve;
pub mod session;
pub mod view;

pub use cache::{DocumentCache, Listener, Notification, SubscriptionId};
pub use engine::{MapEngine, Subscription};
pub use input::{InteractionKind, PointerEvent};
pub use mutation::DocumentMutation;
pub use resolve::{Action, MenuEntry, Resolution, resolve_interaction};
pub use session::{DrawFeedback, DrawMode, DrawingSession, RegionDraft};
pub use view::{MapView, PathToken};
