use clap::Parser;

use pathviz::algorithms::reference_path_length;
use pathviz::config::Config;
use pathviz::playback::PlaybackEvent;
use pathviz::simulation::Visualizer;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
}

fn print_frame(visualizer: &Visualizer) {
    clear_screen();
    println!("Legend: S=Start, T=Target, #=Wall, o=Explored, *=Path, .=Empty");
    print!("{}", visualizer.render());
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let settings = config.grid_settings();

    let mut visualizer = match Visualizer::new(settings) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    log::info!(
        "Grid {}x{}, source {}, target {}, speed {:?}",
        settings.rows,
        settings.cols,
        settings.source,
        settings.target,
        config.speed
    );

    if config.random_walls {
        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("Random walls with seed {} (for reproducibility)", seed);
        let mut rng = StdRng::seed_from_u64(seed);
        if let Err(e) = visualizer.randomize(config.wall_density, &mut rng) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    for wall in &config.walls {
        if visualizer.grid().is_endpoint(*wall) || !visualizer.grid().contains(*wall) {
            log::warn!("Ignoring wall at {}", wall);
        }
        if let Err(e) = visualizer.toggle(wall.row, wall.col) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    let mut handle = match visualizer.run(config.speed) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if config.no_visualization {
        handle.wait();
        visualizer.drain(&handle);
    } else {
        print_frame(&visualizer);
        for event in handle.events().iter() {
            visualizer.apply(handle.epoch(), event);
            print_frame(&visualizer);
            if event == PlaybackEvent::Finished {
                break;
            }
        }
        handle.wait();
    }

    println!("\n=== PATH ANALYSIS ===");
    match visualizer.summary() {
        Some(summary) => print!("{}", summary),
        None => println!("Playback did not finish"),
    }

    match reference_path_length(visualizer.grid()) {
        Some(length) => println!("Reference A* path length: {} steps", length),
        None => println!("Reference A* found no path"),
    }
}
