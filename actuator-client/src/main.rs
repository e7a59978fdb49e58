use std::path::{Path, PathBuf};
use std::time::Instant;

use actuator_shared::{Channel, CurveSet, Frame, ProtocolVersion, TickInput};
use clap::Parser;
use eframe::egui;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use channel::{channel_colors, ChannelCanvas};
use config::Config;
use editor::{scrub, wheel_zoom, zoom_px_per_sec, EditMode, EditorState, Viewport, ZOOM_MAX};
use error::Error;
use track::Track;
use transmitter::Transmitter;
use transport::{PayloadClock, Transport};

mod channel;
mod config;
mod editor;
mod error;
mod headless;
mod project;
mod track;
mod transmitter;
mod transport;

/// Draw actuator control curves over an audio track and stream them during playback.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Actuator endpoint, e.g. http://10.0.11.3:7070
    #[arg(long)]
    actuator: Option<String>,

    /// Frames per second
    #[arg(long)]
    rate: Option<f64>,

    /// Wire format: v1, v2 or v3
    #[arg(long)]
    protocol: Option<ProtocolVersion>,

    /// WAV file to draw over
    #[arg(short, long)]
    track: Option<PathBuf>,

    /// Curves to open, as written by Export
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Stream the project once without opening a window
    #[arg(long, requires = "project")]
    headless: bool,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.override_with(args.actuator, args.rate, args.protocol);
    config.validate()?;

    let track = args.track.as_deref().map(Track::load).transpose()?;
    let curves = args.project.as_deref().map(project::load).transpose()?;

    if args.headless {
        let duration = track
            .as_ref()
            .map_or(config.default_duration, |track| track.duration);
        headless::run(&config, &curves.unwrap_or_default(), duration);
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1024.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Actuator curve editor",
        options,
        Box::new(move |cc| Box::new(App::new(cc, config, track, curves))),
    )?;

    Ok(())
}

/// Everything restored on the next start.
#[derive(Serialize, Deserialize)]
#[serde(default)]
struct Session {
    curves: CurveSet,
    editor: EditorState,
    zoom: f64,
    air_out: bool,
    air_in: bool,
    track_path: String,
    project_path: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            curves: CurveSet::default(),
            editor: EditorState::default(),
            zoom: ZOOM_MAX,
            air_out: false,
            air_in: false,
            track_path: String::new(),
            project_path: "curves.json".to_string(),
        }
    }
}

fn restore_track(path: &str) -> Option<Track> {
    if path.is_empty() {
        return None;
    }
    Track::load(Path::new(path))
        .map_err(|e| error!("{e}"))
        .ok()
}

struct App {
    config: Config,
    session: Session,
    view: Viewport,
    transport: Transport,
    clock: PayloadClock,
    transmitter: Transmitter,
    track: Option<Track>,
    last_frame_time: Instant,
    last_frame: Frame,
}

impl App {
    fn new(
        cc: &eframe::CreationContext<'_>,
        config: Config,
        track: Option<Track>,
        curves: Option<CurveSet>,
    ) -> Self {
        let mut session: Session = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        if let Some(curves) = curves {
            session.curves = curves;
        }
        let track = match track {
            Some(track) => {
                session.track_path = track.path.display().to_string();
                Some(track)
            }
            None => restore_track(&session.track_path),
        };

        let duration = track
            .as_ref()
            .map_or(config.default_duration, |track| track.duration);

        Self {
            session,
            view: Viewport {
                value_range: config.drive.input_full_scale,
                ..Default::default()
            },
            transport: Transport::new(duration),
            clock: PayloadClock::new(config.payload_interval()),
            transmitter: Transmitter::new(config.actuator_url.clone(), config.protocol),
            track,
            last_frame_time: Instant::now(),
            last_frame: Frame::default(),
            config,
        }
    }

    fn tick(&mut self) {
        let tick = TickInput {
            time: self.transport.position(),
            end_time: self.transport.duration(),
            paused: !self.transport.is_playing(),
            air_out: self.session.air_out,
            air_in: self.session.air_in,
        };

        let frame = Frame::build(
            &self.session.curves,
            &tick,
            self.config.protocol,
            &self.config.drive,
        );
        self.transmitter.send(&frame);
        self.last_frame = frame;
    }

    fn load_track(&mut self) {
        match Track::load(Path::new(&self.session.track_path)) {
            Ok(track) => {
                self.transport.set_duration(track.duration);
                self.track = Some(track);
            }
            Err(e) => error!("{e}"),
        }
    }

    fn import_project(&mut self) {
        match project::load(Path::new(&self.session.project_path)) {
            Ok(curves) => {
                self.session.editor.cancel();
                self.session.curves = curves;
            }
            Err(e) => error!("{e}"),
        }
    }

    fn export_project(&self) {
        if let Err(e) = project::save(Path::new(&self.session.project_path), &self.session.curves)
        {
            error!("{e}");
        }
    }

    // egui wheel deltas point the opposite way to browser wheel deltas.
    fn scroll(&mut self, delta: egui::Vec2) {
        if delta.y.abs() > delta.x.abs() {
            self.session.zoom = wheel_zoom(self.session.zoom, -delta.y);
        } else {
            let position = scrub(
                self.transport.position(),
                -delta.x,
                self.transport.duration(),
            );
            self.transport.seek(position);
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let label = if self.transport.is_playing() {
                "Pause"
            } else {
                "Play"
            };
            if ui.button(label).clicked() {
                self.transport.toggle();
            }

            let mut position = self.transport.position();
            if ui
                .add(egui::Slider::new(&mut position, 0.0..=self.transport.duration()).text("s"))
                .changed()
            {
                self.transport.seek(position);
            }

            ui.add(egui::Slider::new(&mut self.session.zoom, 0.0..=ZOOM_MAX).text("Zoom"));
        });

        ui.horizontal(|ui| {
            let editor = &mut self.session.editor;

            let label = if editor.draw_enabled {
                "Switch to Playback Mode"
            } else {
                "Switch to Draw Mode"
            };
            if ui.button(label).clicked() {
                editor.toggle_draw();
            }

            let label = match editor.mode {
                EditMode::Add => "Switch to Delete Points",
                EditMode::Delete => "Switch to Add Points",
            };
            if ui.button(label).clicked() {
                editor.toggle_mode();
            }

            for channel in Channel::ALL {
                let (color, _) = channel_colors(channel);
                let text = egui::RichText::new(channel.name()).color(color);
                if ui
                    .selectable_label(editor.active() == channel, text)
                    .clicked()
                {
                    editor.select(channel);
                }
            }

            if ui.button("Clear").clicked() {
                self.session.curves.curve_mut(editor.active()).clear();
            }

            ui.separator();
            ui.checkbox(&mut self.session.air_out, "Air out");
            ui.checkbox(&mut self.session.air_in, "Air in");
        });

        ui.horizontal(|ui| {
            ui.label("Track:");
            ui.text_edit_singleline(&mut self.session.track_path);
            if ui.button("Load").clicked() {
                self.load_track();
            }

            ui.separator();
            ui.label("Project:");
            ui.text_edit_singleline(&mut self.session.project_path);
            if ui.button("Import").clicked() {
                self.import_project();
            }
            if ui.button("Export").clicked() {
                self.export_project();
            }
        });
    }

    fn readouts(&self, ui: &mut egui::Ui) {
        let time = self.transport.position();
        let end_time = self.transport.duration();
        let curves = &self.session.curves;
        let drive = &self.config.drive;

        ui.horizontal(|ui| {
            let speed = curves.value_at(Channel::Position, time, end_time);
            let amplitude = curves.value_at(Channel::Amplitude, time, end_time);
            let force = curves.value_at(Channel::Force, time, end_time);

            ui.label(format!("Frequency: {:.2} Hz", drive.frequency(speed)));
            ui.label(format!("Amplitude: {:.2}%", drive.amplitude_percent(amplitude)));
            ui.label(format!("Force: {force}"));

            ui.separator();
            ui.label(format!(
                "{} → {}: {}",
                self.transmitter.protocol(),
                self.config.actuator_url,
                self.last_frame
            ));
        });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();

        let dt = {
            let new_time = Instant::now();
            let dt = new_time.saturating_duration_since(self.last_frame_time);
            self.last_frame_time = new_time;
            dt
        };

        self.transport.advance(dt.as_secs_f64());

        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.transport.toggle();
        }

        if self.clock.advance(dt) {
            self.tick();
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| self.controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            self.readouts(ui);

            let duration = self.transport.duration();
            self.view.px_per_sec = zoom_px_per_sec(self.session.zoom, self.view.width, duration);

            let max_start = self.view.max_visible_start(duration);
            self.view.visible_start = self.view.visible_start.clamp(0.0, max_start);
            ui.add(egui::Slider::new(&mut self.view.visible_start, 0.0..=max_start).text("Scroll"));

            let response = ChannelCanvas {
                curves: &mut self.session.curves,
                editor: &mut self.session.editor,
                track: self.track.as_ref(),
                playhead: self.transport.position(),
                duration,
            }
            .ui(ui, &mut self.view);

            if response.edited {
                let channel = self.session.editor.active();
                debug!(
                    "{channel} now has {} points",
                    self.session.curves.curve(channel).len()
                );
            }

            if let Some(delta) = response.scroll {
                self.scroll(delta);
            }
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn restores_saved_track() {
        let path = std::env::temp_dir().join("actuator-client-restore-test.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 1000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..90_000 {
            writer.write_sample(0_i16).unwrap();
        }
        writer.finalize().unwrap();

        let track = restore_track(&path.display().to_string());
        std::fs::remove_file(&path).ok();

        assert_eq!(track.map(|track| track.duration), Some(90.0));
    }

    #[test]
    fn missing_saved_track_is_skipped() {
        assert!(restore_track("").is_none());
        assert!(restore_track("/nonexistent/actuator-track.wav").is_none());
    }
}
