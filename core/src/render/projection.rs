use super::format::{self, NOT_AVAILABLE, UNKNOWN};
use crate::records::{DetectionRecord, DirectDetectionRecord};
use serde::{Deserialize, Serialize};

pub const DASHBOARD_TITLE: &str = "Live Earthquake Tracker";
pub const MAP_CENTER: GeoPoint = GeoPoint {
    latitude: 20.0,
    longitude: 0.0,
};
pub const MAP_ZOOM: u8 = 2;
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerPopup {
    pub location: String,
    pub hazard: String,
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub position: GeoPoint,
    pub popup: MarkerPopup,
}

/// Map widget input: viewport plus marker descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub markers: Vec<MapMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCard {
    pub location: String,
    pub hazard: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectCard {
    pub af: String,
    pub iif: String,
    pub data_from: String,
}

/// Everything the presentation surface shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub title: String,
    pub map: MapView,
    pub alerts: Vec<AlertCard>,
    pub direct: Vec<DirectCard>,
    pub show_direct: bool,
}

impl Default for DashboardView {
    fn default() -> Self {
        project(&[], &[])
    }
}

/// Projects both collections into a view without touching them.
///
/// Only records carrying both coordinates become markers; every record gets a card.
pub fn project(detections: &[DetectionRecord], direct: &[DirectDetectionRecord]) -> DashboardView {
    let markers = detections.iter().filter_map(marker_for).collect();
    let alerts = detections.iter().map(alert_card_for).collect();
    let direct = direct.iter().map(direct_card_for).collect::<Vec<_>>();

    DashboardView {
        title: DASHBOARD_TITLE.into(),
        map: MapView {
            center: MAP_CENTER,
            zoom: MAP_ZOOM,
            tile_url: TILE_URL.into(),
            attribution: TILE_ATTRIBUTION.into(),
            markers,
        },
        alerts,
        show_direct: !direct.is_empty(),
        direct,
    }
}

fn marker_for(record: &DetectionRecord) -> Option<MapMarker> {
    let (latitude, longitude) = record.position()?;
    Some(MapMarker {
        position: GeoPoint {
            latitude,
            longitude,
        },
        popup: MarkerPopup {
            location: format::text_or(record.location.as_deref(), UNKNOWN),
            hazard: format::text_or(record.hazard_type.as_deref(), NOT_AVAILABLE),
            confidence: format::confidence(record.primary_confidence()),
        },
    })
}

fn alert_card_for(record: &DetectionRecord) -> AlertCard {
    AlertCard {
        location: format::text_or(record.location.as_deref(), UNKNOWN),
        hazard: format::text_or(record.hazard_type.as_deref(), NOT_AVAILABLE),
        time: format::timestamp(record.timestamp.as_ref()),
    }
}

fn direct_card_for(record: &DirectDetectionRecord) -> DirectCard {
    DirectCard {
        af: format::raw_value(record.af.as_ref()),
        iif: format::raw_value(record.iif.as_ref()),
        data_from: format::raw_value(record.data_from.as_ref()),
    }
}
