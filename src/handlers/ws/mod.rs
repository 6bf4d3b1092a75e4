//! # WebSocket Recognition Handler Module
//!
//! Persistent per-call intake channel. Each connection owns one order
//! draft for its whole lifetime.
//!
//! ## WebSocket API
//!
//! ### Connection Flow
//! 1. Client connects to `/ws/recognition`
//! 2. Client streams recognition text fragments as text messages
//! 3. After every fragment the server replies with the full merged
//!    `OrderDraft` as JSON, including when the fragment changed nothing
//! 4. Closing the connection discards the draft
//!
//! ### Messages
//!
//! **Incoming:** plain UTF-8 text frames, one recognition fragment each
//! (e.g. `客户张三要买5个苹果`). Binary and ping/pong frames are ignored.
//!
//! **Outgoing:** the serialized draft after each fragment:
//!
//! ```json
//! {
//!   "customer": { "id": 1, "name": "张三", "phone": "13800000000", "exists": true },
//!   "product":  { "name": "苹果", "quantity": 5, "exists": false },
//!   "driver":   { "exists": false }
//! }
//! ```
//!
//! Absent optional fields are omitted. Drafts only ever gain information;
//! a noisy fragment can never clear a field the session already filled.

pub mod handler;

pub use handler::ws_recognition_handler;
