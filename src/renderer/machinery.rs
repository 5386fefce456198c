use std::{
    ops::Deref as _,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
};

use image::{GenericImage as _, GenericImageView as _, RgbImage};

use crate::{
    camera::Camera,
    renderer::{RenderSettings, tiles, tiles::Tile, worker::Worker},
    scene::Scene,
};

pub fn render<F: Fn(&Tile) + Send + Sync + 'static>(
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,
    finished_tile_callback: F,
) -> anyhow::Result<RenderProgress> {
    let resolution = camera.resolution();
    let image = RgbImage::new(resolution.width, resolution.height);
    let state = Arc::new(RenderState {
        scene,
        camera,
        settings,

        image: Mutex::new(image),

        tile_ordering: tiles::tile_ordering(resolution, settings.tile_size),
        next_tile_index: AtomicUsize::new(0),
    });
    let finished_tile_callback = Arc::new(finished_tile_callback);

    let cores = core_affinity::get_core_ids()
        .expect("We need a CPU list!")
        .into_iter()
        .enumerate();

    log::debug!(
        "rendering {} tiles of {}x{} pixels",
        state.tile_ordering.len(),
        settings.tile_size,
        settings.tile_size,
    );

    let threads = cores
        .map(|(worker_id, core)| {
            let state = Arc::clone(&state);
            let finished_tile_callback = Arc::clone(&finished_tile_callback);

            thread::Builder::new()
                .name(format!("worker{worker_id}"))
                .spawn(move || {
                    core_affinity::set_for_current(core);

                    let mut worker = Worker::new();
                    let mut buffer =
                        RgbImage::new(settings.tile_size.into(), settings.tile_size.into());

                    while let Some(tile) = state.get_next_tile() {
                        worker.render_tile(
                            &state.scene,
                            &state.camera,
                            &state.settings,
                            tile,
                            &mut buffer,
                        );
                        state
                            .image
                            .lock()
                            .expect("Poisoned lock!")
                            .copy_from(
                                buffer.view(0, 0, tile.width, tile.height).deref(),
                                tile.min.x,
                                tile.min.y,
                            )
                            .unwrap_or_else(|_| {
                                unreachable!("The buffer should always fit into the output")
                            });

                        (finished_tile_callback)(tile);
                    }
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RenderProgress {
        render_state: state,
        threads,
    })
}

pub struct RenderProgress {
    render_state: Arc<RenderState>,
    threads: Vec<JoinHandle<()>>,
}

impl RenderProgress {
    /// Return number of processed and total tiles.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.render_state.tile_ordering.len();
        let processed = self
            .render_state
            .next_tile_index
            .load(Ordering::Acquire)
            .min(total);
        (processed, total)
    }

    pub fn progress_percent(&self) -> f32 {
        let (processed, total) = self.progress();
        100.0 * (processed as f32) / (total as f32)
    }

    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|handle| handle.is_finished())
    }

    /// Signal the workers to abort.
    /// Any running workers will still finish their tiles, but no new ones will be started.
    pub fn abort(&self) {
        self.render_state
            .next_tile_index
            .store(self.render_state.tile_ordering.len(), Ordering::Release);
    }

    /// Wait for the workers to finish.
    pub fn wait(&mut self) {
        self.threads
            .drain(..)
            .for_each(|handle| handle.join().unwrap());
    }

    pub fn image(&self) -> &Mutex<RgbImage> {
        &self.render_state.image
    }
}

struct RenderState {
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,

    image: Mutex<RgbImage>,

    tile_ordering: Vec<Tile>,
    next_tile_index: AtomicUsize,
}

impl RenderState {
    fn get_next_tile(&self) -> Option<&Tile> {
        let id = self.next_tile_index.fetch_add(1, Ordering::AcqRel);
        self.tile_ordering.get(id)
    }
}
