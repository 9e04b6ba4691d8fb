use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Subscription, Task, Theme,
};
use scancore::store::{MapData, StatisticsSnapshot};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Scan Collector Visualizer".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

fn server_url(path: &str) -> String {
    let base = std::env::var("SCAN_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER.into());
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[derive(Debug)]
struct Visualizer {
    form: SimulationForm,
    dashboard: Option<Dashboard>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    DashboardFetched(Result<Dashboard, String>),
    FormFieldChanged(FormField, String),
    SubmitSimulation,
    SimulationSubmitted(Result<String, String>),
}

#[derive(Debug, Clone, Copy)]
enum FormField {
    DeviceId,
    WifiCount,
    BleCount,
    Seed,
    Description,
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                form: SimulationForm::default(),
                dashboard: None,
                status: "Waiting for scans...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_dashboard(), Message::DashboardFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_dashboard(), Message::DashboardFetched),
            Message::DashboardFetched(Ok(dashboard)) => {
                let previous = state
                    .dashboard
                    .as_ref()
                    .and_then(|current| current.stats.last_update.clone());
                if dashboard.stats.last_update != previous {
                    if let Some(updated) = &dashboard.stats.last_update {
                        state.push_history(format!(
                            "Scan at {}: {} WiFi / {} BLE in buffer",
                            updated, dashboard.stats.total_wifi, dashboard.stats.total_ble
                        ));
                    }
                }
                state.status = format!(
                    "{} scans buffered, {} unique WiFi, {} unique BLE",
                    dashboard.stats.total_scans,
                    dashboard.stats.unique_wifi,
                    dashboard.stats.unique_ble
                );
                state.dashboard = Some(dashboard);
                Task::none()
            }
            Message::DashboardFetched(Err(err)) => {
                state.status = format!("Collector error: {err}");
                Task::none()
            }
            Message::FormFieldChanged(field, value) => {
                state.form.update_field(field, value);
                Task::none()
            }
            Message::SubmitSimulation => {
                let payload = state.form.to_payload();
                Task::perform(post_simulation(payload), Message::SimulationSubmitted)
            }
            Message::SimulationSubmitted(Ok(message)) => {
                state.status = message;
                state.push_history("Synthetic scan submitted".into());
                Task::none()
            }
            Message::SimulationSubmitted(Err(err)) => {
                state.status = format!("Simulation error: {err}");
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let map = state.dashboard.as_ref().and_then(|d| d.map.clone());

        let form_column = column![
            text("Synthetic Scan").size(26),
            text_input("Sensor id", &state.form.device_id)
                .on_input(|value| Message::FormFieldChanged(FormField::DeviceId, value))
                .padding(6),
            text_input("WiFi access points", &state.form.wifi_count)
                .on_input(|value| Message::FormFieldChanged(FormField::WifiCount, value))
                .padding(6),
            text_input("BLE devices", &state.form.ble_count)
                .on_input(|value| Message::FormFieldChanged(FormField::BleCount, value))
                .padding(6),
            text_input("Seed", &state.form.seed)
                .on_input(|value| Message::FormFieldChanged(FormField::Seed, value))
                .padding(6),
            text_input("Description", &state.form.description)
                .on_input(|value| Message::FormFieldChanged(FormField::Description, value))
                .padding(6),
            button("POST synthetic scan")
                .on_press(Message::SubmitSimulation)
                .padding(10),
            text(&state.status).size(14),
            column![
                text("Field notes").size(16),
                text("Sensor id: deviceId attached to the generated report.").size(12),
                text("WiFi / BLE: number of devices in each generated scan (max 64).").size(12),
                text("Seed: fixes device identities so repeated scans track the same devices.")
                    .size(12),
                text("Description: free-text note stored alongside the report.").size(12),
            ]
            .spacing(4)
            .padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(360.0));

        let stats_info = match &state.dashboard {
            Some(dashboard) => text(format!(
                "Scans: {} | WiFi/scan: {:.2} | BLE/scan: {:.2} | sensors: {}",
                dashboard.stats.total_scans,
                dashboard.stats.avg_wifi_per_scan,
                dashboard.stats.avg_ble_per_scan,
                dashboard.stats.unique_devices
            ))
            .size(18),
            None => text("Scans: n/a").size(18),
        };

        let origin_info = match &map {
            Some(map) => text(format!(
                "Origin {} ({:.6}, {:.6}) at {}",
                map.origin.name, map.origin.lat, map.origin.lng, map.timestamp
            ))
            .size(14),
            None => text("No map data yet").size(14),
        };

        let signals = Canvas::new(SignalProfile::new(map.as_ref()))
            .width(Length::Fill)
            .height(Length::Fixed(160.0));

        let device_canvas = Canvas::new(DeviceMap::new(map.as_ref()))
            .width(Length::Fill)
            .height(Length::Fixed(320.0));

        let device_entries = match &map {
            Some(map) if !(map.wifi.is_empty() && map.ble.is_empty()) => {
                let wifi = map.wifi.iter().take(6).map(|ap| {
                    format!(
                        "WiFi {} {} | RSSI {} | {:.1} m @ {}°",
                        ap.observation.bssid.as_deref().unwrap_or("?"),
                        ap.observation.ssid.as_deref().unwrap_or(""),
                        rssi_label(ap.observation.rssi),
                        ap.observation.distance.unwrap_or_default(),
                        ap.bearing
                    )
                });
                let ble = map.ble.iter().take(6).map(|beacon| {
                    format!(
                        "BLE {} {} | RSSI {} | {:.1} m @ {}°",
                        beacon.observation.address.as_deref().unwrap_or("?"),
                        beacon.observation.name.as_deref().unwrap_or(""),
                        rssi_label(beacon.observation.rssi),
                        beacon.observation.distance.unwrap_or_default(),
                        beacon.bearing
                    )
                });
                wifi.chain(ble).fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry).size(12))
                })
            }
            _ => Column::new().push(text("No devices to render").size(12)),
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let telemetry_column = column![
            text("Collector").size(26),
            stats_info,
            origin_info,
            text("Device map (radius = distance, angle = bearing)").size(16),
            device_canvas,
            text("Signal strength, latest scan (strongest first)").size(16),
            signals,
            text("Latest scan devices").size(16),
            Container::new(device_entries).padding(6),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![form_column, telemetry_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,
}

#[derive(Debug, Clone)]
struct Dashboard {
    stats: StatisticsSnapshot,
    map: Option<MapData>,
}

async fn fetch_data<T: DeserializeOwned>(path: &str) -> Result<Option<T>, String> {
    let response = reqwest::get(server_url(path))
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<Envelope<T>>()
        .await
        .map(|envelope| envelope.data)
        .map_err(|e| e.to_string())
}

async fn fetch_dashboard() -> Result<Dashboard, String> {
    let stats = fetch_data::<StatisticsSnapshot>("/api/stats")
        .await?
        .ok_or_else(|| "collector returned no statistics".to_string())?;
    let map = fetch_data::<MapData>("/api/map").await?;
    Ok(Dashboard { stats, map })
}

async fn post_simulation(config: SimulationConfig) -> Result<String, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(server_url("/api/simulate"))
        .json(&config)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok("Synthetic scan ingested".into())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_else(|_| "".into());
        Err(format!("{}: {}", status, text))
    }
}

#[derive(Debug, Clone)]
struct SimulationForm {
    device_id: String,
    wifi_count: String,
    ble_count: String,
    seed: String,
    description: String,
}

impl SimulationForm {
    fn default() -> Self {
        Self {
            device_id: "visualizer".into(),
            wifi_count: "8".into(),
            ble_count: "4".into(),
            seed: "312".into(),
            description: "Visualizer synthetic scan".into(),
        }
    }

    fn update_field(&mut self, field: FormField, value: String) {
        match field {
            FormField::DeviceId => self.device_id = value,
            FormField::WifiCount => self.wifi_count = value,
            FormField::BleCount => self.ble_count = value,
            FormField::Seed => self.seed = value,
            FormField::Description => self.description = value,
        }
    }

    fn to_payload(&self) -> SimulationConfig {
        SimulationConfig {
            device_id: if self.device_id.trim().is_empty() {
                None
            } else {
                Some(self.device_id.trim().to_string())
            },
            wifi_count: self.wifi_count.parse().ok(),
            ble_count: self.ble_count.parse().ok(),
            seed: self.seed.parse().ok(),
            description: if self.description.trim().is_empty() {
                None
            } else {
                Some(self.description.clone())
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wifi_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ble_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    description: Option<String>,
}

const WIFI_COLOR: Color = Color::from_rgb(0.18, 0.72, 0.89);
const BLE_COLOR: Color = Color::from_rgb(0.95, 0.55, 0.2);

const FLOOR_RSSI: i32 = -100;

fn rssi_label(rssi: Option<i32>) -> String {
    rssi.map_or_else(|| "n/a".into(), |rssi| rssi.to_string())
}

/// A device as drawn on the canvases.
#[derive(Debug, Clone, Copy)]
struct Blip {
    bearing: f32,
    distance: f32,
    rssi: f32,
    color: Color,
}

fn blips(map: Option<&MapData>) -> Vec<Blip> {
    let Some(map) = map else {
        return Vec::new();
    };
    let wifi = map.wifi.iter().map(|ap| Blip {
        bearing: ap.bearing as f32,
        distance: ap.observation.distance.unwrap_or_default() as f32,
        rssi: ap.observation.rssi.unwrap_or(FLOOR_RSSI) as f32,
        color: WIFI_COLOR,
    });
    let ble = map.ble.iter().map(|beacon| Blip {
        bearing: beacon.bearing as f32,
        distance: beacon.observation.distance.unwrap_or_default() as f32,
        rssi: beacon.observation.rssi.unwrap_or(FLOOR_RSSI) as f32,
        color: BLE_COLOR,
    });
    wifi.chain(ble).collect()
}

#[derive(Clone)]
struct SignalProfile {
    blips: Vec<Blip>,
}

impl SignalProfile {
    fn new(map: Option<&MapData>) -> Self {
        let mut blips = blips(map);
        blips.sort_by(|a, b| b.rssi.total_cmp(&a.rssi));
        Self { blips }
    }
}

impl canvas::Program<Message> for SignalProfile {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        if !self.blips.is_empty() {
            // -100 dBm maps to an empty bar, -20 dBm to a full one.
            let slot = bounds.width / self.blips.len() as f32;
            for (i, blip) in self.blips.iter().enumerate() {
                let strength = ((blip.rssi + 100.0) / 80.0).clamp(0.02, 1.0);
                let height = strength * bounds.height;
                frame.fill_rectangle(
                    Point::new(i as f32 * slot + 1.0, bounds.height - height),
                    iced::Size::new((slot - 2.0).max(1.0), height),
                    blip.color,
                );
            }
        }

        vec![frame.into_geometry()]
    }
}

#[derive(Clone)]
struct DeviceMap {
    blips: Vec<Blip>,
}

impl DeviceMap {
    fn new(map: Option<&MapData>) -> Self {
        Self { blips: blips(map) }
    }
}

impl canvas::Program<Message> for DeviceMap {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.02, 0.02, 0.04),
        );

        let center = Point::new(bounds.width / 2.0, bounds.height / 2.0);
        let radius = bounds.width.min(bounds.height) / 2.0 - 12.0;

        for ring in 1..=3 {
            let ring_radius = radius * (ring as f32 / 3.0);
            let ring_path = Path::new(|builder| builder.circle(center, ring_radius));
            frame.stroke(
                &ring_path,
                Stroke::default().with_color(Color::from_rgb(0.25, 0.25, 0.3)),
            );
        }

        let axes = Path::new(|builder| {
            builder.move_to(Point::new(center.x - radius, center.y));
            builder.line_to(Point::new(center.x + radius, center.y));
            builder.move_to(Point::new(center.x, center.y - radius));
            builder.line_to(Point::new(center.x, center.y + radius));
        });
        frame.stroke(
            &axes,
            Stroke::default()
                .with_color(Color::from_rgb(0.35, 0.35, 0.45))
                .with_width(1.0),
        );

        let sensor = Path::new(|builder| builder.circle(center, 4.0));
        frame.fill(&sensor, Color::WHITE);

        let max_distance = self
            .blips
            .iter()
            .map(|blip| blip.distance)
            .fold(0.0, f32::max)
            .max(1.0);

        for blip in &self.blips {
            let point_radius = (blip.distance / max_distance).clamp(0.0, 1.0) * radius;
            // Bearing 0 points north and grows clockwise.
            let angle = blip.bearing.to_radians();
            let x = center.x + point_radius * angle.sin();
            let y = center.y - point_radius * angle.cos();

            let strength = ((blip.rssi + 100.0) / 80.0).clamp(0.0, 1.0);
            let marker_radius = 3.0 + strength * 4.0;
            let marker = Path::new(|builder| builder.circle(Point::new(x, y), marker_radius));
            frame.fill(&marker, blip.color);
        }

        vec![frame.into_geometry()]
    }
}
