// Color each vertex according to its graph distance from a source vertex.
//
// The distance is the shortest-path distance along the edges of the mesh
// surface, written out as a grayscale vertex color (near = bright).

use geodis::io::{self, WriteOptions};
use geodis::math::Color;
use geodis::operations::{FieldType, GraphDist};
use geodis::topology::ColorScheme;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("usage: graph_dist <input mesh> <output mesh> <source vertex>");
        std::process::exit(1);
    }
    let Ok(source) = args[3].parse::<u32>() else {
        eprintln!("error: source vertex must be an unsigned integer");
        std::process::exit(1);
    };

    if let Err(err) = run(&args[1], &args[2], source) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(input: &str, output: &str, source: u32) -> geodis::Result<()> {
    let mut mesh = io::read_mesh(input)?;

    // Neighbor queries need connectivity.
    mesh.compute_connectivity();

    let mut gd = GraphDist::new(FieldType::VertexDist);
    gd.sources.push(source);
    gd.compute_shortest_paths(&mesh)?;

    let Some(field) = gd.dist.first() else {
        return Ok(());
    };
    let min_dist = field.min_distance();
    let max_dist = field.max_distance();
    let range = (max_dist - min_dist).max(f64::EPSILON);
    for vertex in mesh.vertices_mut() {
        let value = (max_dist - field.distance(vertex.id())) / range;
        vertex.color = Color::new(value, value, value);
    }
    mesh.set_color_scheme(ColorScheme::VertexColor);

    let options = WriteOptions {
        vertex_colors: true,
        ..WriteOptions::default()
    };
    io::write_mesh(output, &mesh, &options)
}
