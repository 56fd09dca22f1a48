extern crate sdl2;

use anyhow::Result;
use log::{info, warn, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use marbles::{
    render::to_rgb,
    world_gen::{init_marbles, seeded_rng, GenerationConfig},
    Canvas, DisplayConfig, Interaction, Key, MarbleSize, Modifiers, Simulation, SimulationConfig,
};
use nalgebra::{Vector2, Vector3};
use sdl2::event::Event;
use sdl2::gfx::primitives::DrawRenderer;
use sdl2::keyboard::{KeyboardState, Keycode, Scancode};
use sdl2::mouse::MouseButton;
use sdl2::pixels::Color;
use sdl2::render::WindowCanvas;
use std::time::{Duration, Instant};

const FRAME_TIME_CAP: Duration = Duration::from_millis(16);

struct SdlCanvas<'a> {
    canvas: &'a mut WindowCanvas,
    bound_width: u8,
}

fn color(color: &Vector3<f32>) -> Color {
    let (r, g, b) = to_rgb(color);
    Color::RGB(r, g, b)
}

impl Canvas for SdlCanvas<'_> {
    fn circle(&mut self, center: &Vector2<f64>, radius: f64, fill: &Vector3<f32>) {
        if let Err(e) = self.canvas.filled_circle(
            center.x.round() as i16,
            center.y.round() as i16,
            radius.round() as i16,
            color(fill),
        ) {
            warn!("Failed to draw marble: {}", e);
        }
    }

    fn segment(&mut self, start: &Vector2<f64>, end: &Vector2<f64>) {
        if let Err(e) = self.canvas.thick_line(
            start.x.round() as i16,
            start.y.round() as i16,
            end.x.round() as i16,
            end.y.round() as i16,
            self.bound_width,
            Color::RGB(0, 0, 0),
        ) {
            warn!("Failed to draw bound: {}", e);
        }
    }
}

fn init_logging() -> Result<()> {
    let level = std::env::var("MARBLES_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info);
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S%.3f)} {h({l})} {t} - {m}{n}",
        )))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn modifiers(keyboard: &KeyboardState) -> Modifiers {
    let size = if keyboard.is_scancode_pressed(Scancode::Num1) {
        Some(MarbleSize::Small)
    } else if keyboard.is_scancode_pressed(Scancode::Num2) {
        Some(MarbleSize::Medium)
    } else if keyboard.is_scancode_pressed(Scancode::Num3) {
        Some(MarbleSize::Large)
    } else {
        None
    };
    Modifiers {
        shift: keyboard.is_scancode_pressed(Scancode::LShift)
            || keyboard.is_scancode_pressed(Scancode::RShift),
        size,
    }
}

pub fn main() -> Result<()> {
    init_logging()?;
    let display = DisplayConfig::default();

    // Setup.
    let sdl_context = sdl2::init().map_err(anyhow::Error::msg)?;
    let video_subsystem = sdl_context.video().map_err(anyhow::Error::msg)?;
    let window = video_subsystem
        .window("Marbles", display.width, display.height)
        .position_centered()
        .build()?;
    let mut canvas = window.into_canvas().build()?;
    let mut event_pump = sdl_context.event_pump().map_err(anyhow::Error::msg)?;

    // Initialize world.
    let mut simulation = Simulation::new(SimulationConfig {
        width: display.width as f64,
        height: display.height as f64,
        ..SimulationConfig::default()
    });
    init_marbles(&mut simulation, &GenerationConfig::default(), &mut seeded_rng());
    let mut interaction = Interaction::default();

    let mut last_frame = Instant::now();
    'running: loop {
        let events: Vec<Event> = event_pump.poll_iter().collect();
        for event in events {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::KeyDown {
                    keycode: Some(keycode),
                    ..
                } => {
                    let key = match keycode {
                        Keycode::Left => Key::Left,
                        Keycode::Right => Key::Right,
                        Keycode::Up => Key::Up,
                        Keycode::Down => Key::Down,
                        Keycode::Space => Key::Space,
                        _ => continue,
                    };
                    interaction.key(&mut simulation, key);
                }
                Event::MouseButtonDown {
                    mouse_btn: MouseButton::Left,
                    x,
                    y,
                    ..
                } => {
                    let held = modifiers(&event_pump.keyboard_state());
                    interaction.click(&mut simulation, Vector2::new(x as f64, y as f64), held);
                }
                _ => {}
            }
        }

        simulation.step();

        let (r, g, b) = to_rgb(&display.background);
        canvas.set_draw_color(Color::RGB(r, g, b));
        canvas.clear();
        simulation.draw(&mut SdlCanvas {
            canvas: &mut canvas,
            bound_width: display.bound_width,
        });
        canvas.present();

        // Cap the frame rate.
        let elapsed = last_frame.elapsed();
        if elapsed < FRAME_TIME_CAP {
            std::thread::sleep(FRAME_TIME_CAP - elapsed);
        }
        if simulation.frame() % 600 == 0 {
            info!(
                "Frame {}: {} marbles, last frame took {:?}",
                simulation.frame(),
                simulation.marble_count(),
                elapsed
            );
        }
        last_frame = Instant::now();
    }
    Ok(())
}
