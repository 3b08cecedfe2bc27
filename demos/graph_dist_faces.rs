// Color each face according to its graph distance from a source face.
//
// The distance runs between face centroids across shared edges. Each
// face's grayscale value is pushed onto its corner vertices so any viewer
// that understands vertex colors can display the field.

use geodis::io::{self, WriteOptions};
use geodis::math::Color;
use geodis::operations::{FieldType, GraphDist};
use geodis::topology::{ColorScheme, VertexId};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("usage: graph_dist_faces <input mesh> <output mesh> <source face>");
        std::process::exit(1);
    }
    let Ok(source) = args[3].parse::<u32>() else {
        eprintln!("error: source face must be an unsigned integer");
        std::process::exit(1);
    };

    if let Err(err) = run(&args[1], &args[2], source) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(input: &str, output: &str, source: u32) -> geodis::Result<()> {
    let mut mesh = io::read_mesh(input)?;
    mesh.compute_connectivity();

    let mut gd = GraphDist::new(FieldType::FaceDist);
    gd.sources.push(source);
    gd.compute_shortest_paths(&mesh)?;

    let Some(field) = gd.dist.first() else {
        return Ok(());
    };
    let min_dist = field.min_distance();
    let max_dist = field.max_distance();
    let range = (max_dist - min_dist).max(f64::EPSILON);

    let face_corners: Vec<([VertexId; 3], f64)> = mesh
        .faces()
        .map(|face| (face.vertex_ids(), field.distance(face.id())))
        .collect();
    for (corners, distance) in face_corners {
        let value = (max_dist - distance) / range;
        for v in corners {
            if let Some(vertex) = mesh.vertex_mut(v) {
                vertex.color = Color::new(value, value, value);
            }
        }
    }
    mesh.set_color_scheme(ColorScheme::VertexColor);

    let options = WriteOptions {
        vertex_colors: true,
        ..WriteOptions::default()
    };
    io::write_mesh(output, &mesh, &options)
}
