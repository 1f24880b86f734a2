//! Read-only projection of the record collections into dashboard views.

pub mod format;
pub mod projection;
pub mod surface;

pub use projection::{
    project, AlertCard, DashboardView, DirectCard, GeoPoint, MapMarker, MapView, MarkerPopup,
};
pub use surface::RenderSurface;
