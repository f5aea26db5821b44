//! FaceLens core: real-time face analysis with remote attribute enrichment.
//!
//! Layout follows a domain/infrastructure split per feature:
//! - `detection` — on-device face localization and full-face inference (ort)
//! - `attributes` — remote attribute client, raw wire types, pure extractors
//! - `overlay` — annotation rendering onto the display surface
//! - `video` — camera/frame acquisition
//! - `pipeline` — the dual-cadence analysis session and its shared result
//! - `shared` — frame/region primitives, constants, model resolution

pub mod attributes;
pub mod detection;
pub mod overlay;
pub mod pipeline;
pub mod shared;
pub mod video;
