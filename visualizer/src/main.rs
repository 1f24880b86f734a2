use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, Column, Container, Row,
    },
    Alignment, Color, Element, Length, Pixels, Point, Rectangle, Renderer, Subscription, Task,
    Theme,
};
use quakecore::render::{
    AlertCard, DashboardView, DirectCard, GeoPoint, MapMarker, MapView,
};
use std::time::Duration;

const BRIDGE_URL: &str = "http://127.0.0.1:9000";
const DIRECT_GRID_COLUMNS: usize = 3;

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(state: &Visualizer) -> String {
    state.dashboard.title.clone()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    dashboard: DashboardView,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    DashboardFetched(Result<DashboardView, String>),
    RefreshRequested,
    Refreshed(Result<String, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                dashboard: DashboardView::default(),
                status: "Waiting for detections...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_dashboard(), Message::DashboardFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_dashboard(), Message::DashboardFetched),
            Message::DashboardFetched(Ok(dashboard)) => {
                let changed = dashboard != state.dashboard;
                state.status = format!(
                    "{} alerts / {} on map / {} sensor records",
                    dashboard.alerts.len(),
                    dashboard.map.markers.len(),
                    dashboard.direct.len()
                );
                if changed {
                    state.push_history(format!(
                        "Dashboard updated: {} alerts, {} sensor records",
                        dashboard.alerts.len(),
                        dashboard.direct.len()
                    ));
                }
                state.dashboard = dashboard;
                Task::none()
            }
            Message::DashboardFetched(Err(err)) => {
                state.status = format!("Bridge error: {err}");
                Task::none()
            }
            Message::RefreshRequested => Task::perform(post_refresh(), Message::Refreshed),
            Message::Refreshed(Ok(message)) => {
                state.status = message;
                state.push_history("Refresh requested".into());
                Task::none()
            }
            Message::Refreshed(Err(err)) => {
                state.status = format!("Refresh error: {err}");
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let dashboard = &state.dashboard;

        let map = Canvas::new(WorldMap::new(&dashboard.map))
            .width(Length::Fill)
            .height(Length::Fixed(420.0));

        let map_column = column![
            text(dashboard.title.clone()).size(28),
            map,
            text(dashboard.map.attribution.clone()).size(11),
            row![
                button("Refresh sweeps")
                    .on_press(Message::RefreshRequested)
                    .padding(10),
                text(&state.status).size(14),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
            text("Activity log").size(16),
            Container::new(scrollable(history_list(&state.history)).height(Length::Fixed(90.0)))
                .padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::FillPortion(3));

        let alerts_column = column![
            text("Alerts").size(24),
            scrollable(alert_list(&dashboard.alerts)).height(Length::Fill),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::FillPortion(2));

        let mut content = Column::new().spacing(20).push(
            row![map_column, alerts_column]
                .spacing(20)
                .align_y(Alignment::Start),
        );
        if dashboard.show_direct {
            content = content.push(
                column![
                    text("ESP32 Threat Data").size(24),
                    scrollable(direct_grid(&dashboard.direct)).height(Length::Fixed(220.0)),
                ]
                .spacing(10)
                .padding(16),
            );
        }

        Container::new(content.padding(20))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

fn history_list(history: &[String]) -> Column<'_, Message> {
    if history.is_empty() {
        Column::new().push(text("No activity yet").size(12))
    } else {
        history
            .iter()
            .rev()
            .fold(Column::new().spacing(4), |col, entry| {
                col.push(text(entry.clone()).size(12))
            })
    }
}

fn alert_list(alerts: &[AlertCard]) -> Column<'_, Message> {
    if alerts.is_empty() {
        return Column::new().push(text("No alerts").size(14));
    }
    alerts.iter().fold(Column::new().spacing(8), |col, card| {
        col.push(
            Container::new(
                column![
                    text(format!("Location: {}", card.location)).size(14),
                    text(format!("Hazard: {}", card.hazard)).size(14),
                    text(format!("Time: {}", card.time)).size(14),
                ]
                .spacing(2),
            )
            .padding(8)
            .width(Length::Fill),
        )
    })
}

fn direct_grid(cards: &[DirectCard]) -> Column<'_, Message> {
    cards
        .chunks(DIRECT_GRID_COLUMNS)
        .fold(Column::new().spacing(8), |grid, chunk| {
            let line = chunk.iter().fold(Row::new().spacing(8), |line, card| {
                line.push(
                    Container::new(
                        column![
                            text(format!("AF: {}", card.af)).size(14),
                            text(format!("IIF: {}", card.iif)).size(14),
                            text(format!("Data From: {}", card.data_from)).size(14),
                        ]
                        .spacing(2),
                    )
                    .padding(8)
                    .width(Length::FillPortion(1)),
                )
            });
            grid.push(line)
        })
}

async fn fetch_dashboard() -> Result<DashboardView, String> {
    let response = reqwest::get(format!("{BRIDGE_URL}/dashboard"))
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<DashboardView>()
        .await
        .map_err(|e| e.to_string())
}

async fn post_refresh() -> Result<String, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{BRIDGE_URL}/refresh"))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok("Sweeps refreshed".into())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(format!("{}: {}", status, text))
    }
}

/// Equirectangular stand-in for the tile map: graticule, markers, hover popup.
#[derive(Clone)]
struct WorldMap {
    center: GeoPoint,
    zoom: u8,
    markers: Vec<MapMarker>,
}

impl WorldMap {
    fn new(view: &MapView) -> Self {
        Self {
            center: view.center,
            zoom: view.zoom,
            markers: view.markers.clone(),
        }
    }

    /// Pixels per degree; zoom 2 fits the whole globe across the canvas.
    fn scale(&self, bounds: Rectangle) -> f32 {
        let zoom_factor = 2f32.powi(i32::from(self.zoom) - 2);
        bounds.width / 360.0 * zoom_factor
    }

    fn project(&self, bounds: Rectangle, point: GeoPoint) -> Point {
        let scale = self.scale(bounds);
        Point::new(
            bounds.width / 2.0 + (point.longitude - self.center.longitude) as f32 * scale,
            bounds.height / 2.0 - (point.latitude - self.center.latitude) as f32 * scale,
        )
    }

    fn hovered(&self, bounds: Rectangle, cursor: mouse::Cursor) -> Option<(Point, &MapMarker)> {
        let position = cursor.position_in(bounds)?;
        self.markers
            .iter()
            .map(|marker| (self.project(bounds, marker.position), marker))
            .find(|(point, _)| point.distance(position) <= 8.0)
    }
}

impl canvas::Program<Message> for WorldMap {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.03, 0.06, 0.10),
        );

        let graticule = Path::new(|builder| {
            for lon in (-180..=180).step_by(30) {
                let top = self.project(bounds, GeoPoint { latitude: 90.0, longitude: f64::from(lon) });
                let bottom =
                    self.project(bounds, GeoPoint { latitude: -90.0, longitude: f64::from(lon) });
                builder.move_to(top);
                builder.line_to(bottom);
            }
            for lat in (-90..=90).step_by(30) {
                let west =
                    self.project(bounds, GeoPoint { latitude: f64::from(lat), longitude: -180.0 });
                let east =
                    self.project(bounds, GeoPoint { latitude: f64::from(lat), longitude: 180.0 });
                builder.move_to(west);
                builder.line_to(east);
            }
        });
        frame.stroke(
            &graticule,
            Stroke::default()
                .with_color(Color::from_rgb(0.20, 0.26, 0.32))
                .with_width(1.0),
        );

        for marker in &self.markers {
            let point = self.project(bounds, marker.position);
            let dot = Path::new(|builder| builder.circle(point, 5.0));
            frame.fill(&dot, Color::from_rgb(0.95, 0.35, 0.2));
        }

        if let Some((point, marker)) = self.hovered(bounds, cursor) {
            let lines = [
                format!("Location: {}", marker.popup.location),
                format!("Hazard: {}", marker.popup.hazard),
                format!("Confidence: {}", marker.popup.confidence),
            ];
            let origin = Point::new(point.x + 10.0, point.y - 10.0);
            frame.fill_rectangle(
                origin,
                iced::Size::new(190.0, 52.0),
                Color::from_rgba(0.0, 0.0, 0.0, 0.8),
            );
            for (idx, line) in lines.into_iter().enumerate() {
                frame.fill_text(canvas::Text {
                    content: line,
                    position: Point::new(origin.x + 6.0, origin.y + 4.0 + idx as f32 * 15.0),
                    color: Color::WHITE,
                    size: Pixels(12.0),
                    ..canvas::Text::default()
                });
            }
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::Size;
    use quakecore::render::MarkerPopup;

    fn world(zoom: u8, markers: Vec<MapMarker>) -> WorldMap {
        WorldMap {
            center: GeoPoint {
                latitude: 20.0,
                longitude: 0.0,
            },
            zoom,
            markers,
        }
    }

    fn marker_at(latitude: f64, longitude: f64) -> MapMarker {
        MapMarker {
            position: GeoPoint {
                latitude,
                longitude,
            },
            popup: MarkerPopup {
                location: "Tokyo".into(),
                hazard: "quake".into(),
                confidence: "N/A".into(),
            },
        }
    }

    #[test]
    fn center_projects_to_canvas_middle() {
        let bounds = Rectangle::new(Point::ORIGIN, Size::new(720.0, 360.0));
        let map = world(2, Vec::new());
        let point = map.project(
            bounds,
            GeoPoint {
                latitude: 20.0,
                longitude: 0.0,
            },
        );
        assert_eq!(point, Point::new(360.0, 180.0));
    }

    #[test]
    fn higher_zoom_spreads_points_apart() {
        let bounds = Rectangle::new(Point::ORIGIN, Size::new(720.0, 360.0));
        let east = GeoPoint {
            latitude: 20.0,
            longitude: 90.0,
        };
        let wide = world(2, Vec::new()).project(bounds, east);
        let close = world(3, Vec::new()).project(bounds, east);
        assert_eq!(wide.x, 540.0);
        assert_eq!(close.x, 720.0);
    }

    #[test]
    fn hover_picks_the_marker_under_the_cursor() {
        let bounds = Rectangle::new(Point::ORIGIN, Size::new(720.0, 360.0));
        let map = world(2, vec![marker_at(20.0, 0.0)]);
        let hit = map.hovered(bounds, mouse::Cursor::Available(Point::new(362.0, 181.0)));
        assert!(hit.is_some());
        let miss = map.hovered(bounds, mouse::Cursor::Available(Point::new(10.0, 10.0)));
        assert!(miss.is_none());
    }
}
