//! Basic demonstration of the ballistics simulation.
//!
//! Run with: cargo run --example basic_demo

use ballistics_sim::SimWorld;

const GRAVITY: f64 = 9.81;

fn main() {
    println!("=== Ballistics Sim - Demo ===\n");

    let mut sim = SimWorld::new();

    // Start a scored challenge and take the shot.
    let brief = sim.start_challenge();
    println!("Challenge: {}", brief.description);
    println!(
        "Target at {:.1} m (altitude {:.1} m)\n",
        brief.target_distance, brief.target_altitude
    );

    // A plain ballistic shot plus a thrust-assisted one for comparison.
    let ballistic = sim.launch(0.0, 0.0, 35.0, 45.0, 0.0, 0.0).unwrap();
    let powered = sim.launch(0.0, 0.0, 20.0, 60.0, 15.0, 1.5).unwrap();

    println!("Running at 20 frames/sec with air resistance...\n");
    let mut resolved = false;
    for frame in 0..400 {
        sim.update(0.05, GRAVITY, true);

        if (frame + 1) % 20 == 0 {
            println!(
                "--- Tick {} (t={:.1}s) ---",
                sim.current_tick(),
                sim.current_time()
            );
            print_snapshot(&mut sim);
        }

        if !resolved {
            if let Some(outcome) = sim.check_collision(ballistic) {
                if outcome.ground {
                    sim.retire(ballistic);
                    let points = sim.update_score(outcome.hit);
                    println!(
                        "\nBallistic shot landed: {} (score {})\n",
                        if outcome.hit { "HIT" } else { "miss" },
                        points
                    );
                    resolved = true;
                }
            }
        }
        if let Some(outcome) = sim.check_collision(powered) {
            if outcome.ground {
                sim.retire(powered);
            }
        }

        let all_down = sim
            .snapshot()
            .projectiles
            .iter()
            .all(|p| !p.active);
        if all_down {
            break;
        }
    }

    if let Some(bounds) = sim.bounds(ballistic) {
        println!(
            "Ballistic flight envelope: {:.1} m wide, {:.1} m tall",
            bounds.width(),
            bounds.height()
        );
    }
    if let Some(path) = sim.path(powered) {
        println!("Powered flight recorded {} path samples", path.len());
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty().unwrap());
}

fn print_snapshot(sim: &mut SimWorld) {
    let snapshot = sim.snapshot();

    for p in &snapshot.projectiles {
        println!(
            "    Projectile {}: pos=({:.1}, {:.1}) vel=({:.1}, {:.1}) fuel={:.2} peak={:.1} [{}{}]",
            p.id,
            p.x,
            p.y,
            p.vx,
            p.vy,
            p.fuel,
            p.peak_height,
            p.backend,
            if p.active { "" } else { ", down" }
        );
    }
}
