//! Atrophy CLI - surface partitioning and atrophy measurement.
//!
//! Usage: atrophy <COMMAND> [OPTIONS] <INPUTS>...
//!
//! Run `atrophy --help` for available commands. Set `RUST_LOG=debug` for
//! detailed logging.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use atrophy::algo::adjacency::FaceAdjacency;
use atrophy::algo::partition::{
    node_weights_from_areas, partition_graph_with_progress, shuffle_labels, Graph,
    PartitionOptions, DEFAULT_WEIGHT_SCALE, PART_ARRAY,
};
use atrophy::algo::register::center_transform;
use atrophy::algo::roi::{roi_volumes, DEFAULT_LABELS};
use atrophy::algo::smooth::{taubin_smooth_with_progress, SmoothOptions};
use atrophy::algo::thickness::thickness_delta;
use atrophy::algo::Progress;
use atrophy::io::{self, vtk};
use atrophy::mesh::DataArray;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "atrophy")]
#[command(author, version, about = "Surface partitioning and atrophy measurement", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Partition a surface mesh into regions of similar area
    Partition(PartitionArgs),

    /// Per-tetrahedron thickness and volume change between two meshes
    ThicknessDelta {
        /// Baseline tetrahedral mesh (VTK)
        baseline: PathBuf,

        /// Follow-up tetrahedral mesh with the same connectivity (VTK)
        followup: PathBuf,

        /// Output mesh
        result: PathBuf,

        /// Experiment ID (prefixed to output arrays)
        #[arg(short, long)]
        expid: Option<String>,
    },

    /// Print a whole-voxel transform aligning the centers of two images
    CenterTfm {
        /// Fixed image (NIfTI)
        fixed: PathBuf,

        /// Moving image (NIfTI)
        moving: PathBuf,
    },

    /// Print label-weighted regional volumes as CSV
    RoiVolumes(RoiArgs),
}

#[derive(Args)]
struct PartitionArgs {
    /// Input surface mesh (.vtk or .ply)
    source: PathBuf,

    /// Output partitioned mesh (.vtk or .ply)
    result: PathBuf,

    /// Number of partitioning regions (0 skips partitioning)
    #[arg(short = 'n', long = "regions", default_value = "80")]
    regions: usize,

    /// Iterations of Taubin smoothing
    #[arg(short = 's', long = "smooth", default_value = "0")]
    smooth: usize,

    /// Taubin lambda parameter
    #[arg(short = 'l', long, default_value = "0.6", allow_negative_numbers = true)]
    lambda: f64,

    /// Taubin mu parameter
    #[arg(short = 'm', long, default_value = "-0.4", allow_negative_numbers = true)]
    mu: f64,

    /// Randomly shuffle region labels
    #[arg(short = 'r', long)]
    shuffle: bool,

    /// Seed for the label shuffle (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Use single-threaded smoothing
    #[arg(long)]
    sequential: bool,
}

#[derive(Args)]
struct RoiArgs {
    /// Tetrahedral mesh with Voronoi centers, in the segmentation's space
    #[arg(short = 'm', long = "tetra-fix", alias = "tetra_fix")]
    tetra_fix: PathBuf,

    /// Tetrahedral mesh with a Jacobian cell array
    #[arg(short = 'j', long = "tetra-trj", alias = "tetra_trj")]
    tetra_jac: PathBuf,

    /// Segmentation image (NIfTI)
    #[arg(short = 's', long = "seg")]
    seg: PathBuf,

    /// Subject ID to print
    #[arg(short = 'i', long = "id")]
    id: String,

    /// Labels to report
    #[arg(short = 'l', long, value_delimiter = ',', default_values_t = DEFAULT_LABELS)]
    labels: Vec<i64>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CmdResult {
    match cli.command {
        Commands::Partition(args) => cmd_partition(&args),
        Commands::ThicknessDelta {
            baseline,
            followup,
            result,
            expid,
        } => cmd_thickness_delta(&baseline, &followup, &result, expid.as_deref()),
        Commands::CenterTfm { fixed, moving } => cmd_center_tfm(&fixed, &moving),
        Commands::RoiVolumes(args) => cmd_roi_volumes(&args),
    }
}

/// Create a progress reporter that draws a bar on stderr.
///
/// Each long-running stage gets its own reporter so the bar restarts at 0%.
fn create_progress() -> Progress {
    // Highest percent drawn so far; usize::MAX until the first draw
    let shown = AtomicUsize::new(usize::MAX);

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        let previous = shown.load(Ordering::Relaxed);
        if previous != usize::MAX && percent <= previous {
            return;
        }
        shown.store(percent, Ordering::Relaxed);

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        eprint!(
            "\r[{}{}] {:3}% {}",
            "=".repeat(filled),
            " ".repeat(bar_width - filled),
            percent,
            message
        );
        let _ = std::io::stderr().flush();

        if percent == 100 {
            eprintln!();
        }
    })
}

fn cmd_partition(args: &PartitionArgs) -> CmdResult {
    let mut mesh = io::load_surface(&args.source)?;
    println!(
        "Loaded: {} vertices, {} triangles",
        mesh.num_vertices(),
        mesh.num_faces()
    );

    let start = Instant::now();

    if args.smooth > 0 {
        let options = SmoothOptions::default()
            .with_iterations(args.smooth)
            .with_lambda(args.lambda)
            .with_mu(args.mu)
            .with_parallel(!args.sequential);
        taubin_smooth_with_progress(&mut mesh, &options, &create_progress());
    }

    if args.regions > 0 {
        let adjacency = FaceAdjacency::from_mesh(&mesh);
        info!(
            "face adjacency: {} triangles, {} shared-edge pairs",
            adjacency.len(),
            adjacency.num_pairs()
        );

        let weights = node_weights_from_areas(&mesh.face_areas(), DEFAULT_WEIGHT_SCALE);
        let graph = Graph::from_adjacency(&adjacency, weights)?;
        let parts = partition_graph_with_progress(
            &graph,
            args.regions,
            &PartitionOptions::default(),
            &create_progress(),
        )?;

        let mut labels = parts.labels;
        if args.shuffle {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            shuffle_labels(&mut labels, args.regions, &mut rng);
        }

        let labels = labels.into_iter().map(|l| l as i64).collect();
        mesh.set_cell_array(DataArray::int(PART_ARRAY, 1, labels))?;
        println!(
            "Partitioned into {} regions (edge cut {})",
            args.regions, parts.edge_cut
        );
    }

    let elapsed = start.elapsed();
    io::save_surface(&mesh, &args.result)?;
    println!("Saved: {} ({:.2?})", args.result.display(), elapsed);

    Ok(())
}

fn cmd_thickness_delta(
    baseline: &Path,
    followup: &Path,
    result: &Path,
    expid: Option<&str>,
) -> CmdResult {
    let mut bl = vtk::load_tetmesh(baseline)?;
    let fu = vtk::load_tetmesh(followup)?;
    println!(
        "Loaded: {} points, {} tetrahedra",
        bl.num_points(),
        bl.num_cells()
    );

    let start = Instant::now();
    thickness_delta(&mut bl, &fu, expid)?;
    let elapsed = start.elapsed();

    vtk::save_tetmesh(&bl, result)?;
    println!("Saved: {} ({:.2?})", result.display(), elapsed);

    Ok(())
}

fn cmd_center_tfm(fixed: &Path, moving: &Path) -> CmdResult {
    let fix = io::load_image(fixed)?;
    let mov = io::load_image(moving)?;
    info!("fixed size {:?}, moving size {:?}", fix.dims(), mov.dims());

    print!("{}", center_transform(&fix, &mov));
    Ok(())
}

fn cmd_roi_volumes(args: &RoiArgs) -> CmdResult {
    let seg_mesh = vtk::load_tetmesh(&args.tetra_fix)?;
    let jac_mesh = vtk::load_tetmesh(&args.tetra_jac)?;
    let seg = io::load_image(&args.seg)?;

    for roi in roi_volumes(&seg_mesh, &jac_mesh, &seg, &args.labels)? {
        println!("{}", roi.csv_row(&args.id));
    }
    Ok(())
}
