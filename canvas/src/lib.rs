//! Measurement and annotation engine for the roof sketch canvas.
//!
//! The crate owns everything that happens on the drawing surface: turning raw
//! pointer and gesture events into document mutations, snapping stroke
//! endpoints, moving and rotating shape elements, and rasterizing the result.
//! It is synchronous and has no I/O beyond writing a PNG on request. The host
//! (the `roofsketch` binary) persists the document and reacts to the
//! [`engine::Action`]s the engine returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::SketchEngine`]: commands in, actions out |
//! | [`input`] | Tools, raw events, gesture state machine, intent router |
//! | [`doc`] | Document types and the revisioned [`doc::SketchStore`] |
//! | [`path`] | Typed polylines and the `M x,y L x,y` wire form |
//! | [`snap`] | Nearest committed endpoint within the snap radius |
//! | [`transform`] | Drag, rotate, provisional shapes, handle placement |
//! | [`hit`] | Hit-testing elements and handles |
//! | [`camera`] | Points and the screen-to-canvas transform |
//! | [`render`] | Off-screen raster renderer and PNG export |
//! | [`consts`] | Shared geometric thresholds |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod path;
pub mod render;
pub mod snap;
pub mod transform;
