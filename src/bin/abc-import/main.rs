//! abc-import - Inspect geometry caches and the buffers produced from them.

use alembic_importer::memory::{write_scene, SceneDesc};
use alembic_importer::prelude::*;
use anyhow::{bail, Context, Result};
use std::env;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg.as_str()),
        }
    }
    init_tracing(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        "info" | "i" => with_file(&filtered_args, "abc-import info <file>", cmd_info),
        "tree" | "t" => with_file(&filtered_args, "abc-import tree <file>", cmd_tree),
        "mesh" | "m" => {
            if filtered_args.len() < 3 {
                usage("abc-import mesh <file> <object-path> [options]")
            } else {
                cmd_mesh(filtered_args[1], filtered_args[2], &filtered_args[3..])
            }
        }
        "play" | "p" => {
            if filtered_args.len() < 5 {
                usage("abc-import play <file> <from> <to> <step>")
            } else {
                cmd_play(filtered_args[1], &filtered_args[2..5])
            }
        }
        "pack" => {
            if filtered_args.len() < 3 {
                usage("abc-import pack <in.json> <out.json.gz>")
            } else {
                cmd_pack(filtered_args[1], filtered_args[2])
            }
        }
        "settings" => cmd_settings(&filtered_args[1..]),
        "version" | "--version" => {
            println!("abc-import {} ({})", env!("CARGO_PKG_VERSION"), env!("ABC_IMPORT_BUILD_DATE"));
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        // Default: if file exists, show info; otherwise error
        other => {
            if Path::new(other).exists() {
                cmd_info(other)
            } else {
                eprintln!("Unknown command: {}", other);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn usage(text: &str) -> Result<()> {
    bail!("missing arguments\nUsage: {}", text)
}

fn with_file(args: &[&str], text: &str, f: fn(&str) -> Result<()>) -> Result<()> {
    match args.get(1) {
        Some(path) => f(path),
        None => usage(text),
    }
}

fn print_help() {
    println!("abc-import - Geometry cache import toolkit");
    println!();
    println!("USAGE:");
    println!("    abc-import [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file>                    Show archive info and object counts");
    println!("    t, tree   <file>                    Show full object hierarchy");
    println!("    m, mesh   <file> <path> [options]   Convert one mesh and print its buffers");
    println!("    p, play   <file> <from> <to> <step> Step through time, report refreshes");
    println!("    pack      <in.json> <out.json.gz>   Compress a scene description");
    println!("    settings  [--save | --reset]        Print effective settings, or write them");
    println!("    version                             Show version");
    println!("    h, help                             Show this help");
    println!();
    println!("MESH OPTIONS:");
    println!("    --time <t>           Sample time (default 0)");
    println!("    --no-triangulate     Keep n-gons in the index buffer");
    println!("    --swap-handedness    Negate X");
    println!("    --swap-winding       Flip triangle winding");
    println!("    --normals <mode>     read_from_file, compute_if_missing, always_compute, ignore");
    println!("    --max-vertices <n>   Chunk budget for split meshes");
    println!("    --dump               Print every vertex and index");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Errors only");
    println!();
    println!("NOTES:");
    println!("    - Scenes are JSON or gzip-compressed JSON");
    println!("    - RUST_LOG overrides the verbosity flags");
    println!("    - Settings are read from the user config directory");
}

fn open(path: &str, settings: ImportSettings) -> Result<Session> {
    info!("Opening archive: {}", path);
    let mut session = Session::new(settings);
    session.load(path).with_context(|| format!("failed to open {}", path))?;
    debug!("Archive opened successfully");
    Ok(session)
}

/// Object counts for statistics
#[derive(Default)]
struct ObjectCounts {
    xform: usize,
    mesh: usize,
    other: usize,
    total_verts: usize,
    total_faces: usize,
    total_tris: usize,
}

fn cmd_info(path: &str) -> Result<()> {
    let mut session = open(path, ImportSettings::load())?;
    session.set_time(0.0);
    let stats = session.update()?;

    println!("Archive: {}", path);
    if let Some((start, end)) = session.archive().and_then(|a| a.time_range()) {
        println!("Time range: {:.3} - {:.3}", start, end);
    }
    println!();

    let mut counts = ObjectCounts::default();
    session.for_each_object(|_, obj| match obj.schema_kind() {
        SchemaKind::Xform => counts.xform += 1,
        SchemaKind::PolyMesh => {
            counts.mesh += 1;
            if let Some(mesh) = obj.polymesh() {
                counts.total_verts += mesh.vertex_count();
                counts.total_faces += mesh.sample().num_faces();
                counts.total_tris += mesh.triangle_count();
            }
        }
        SchemaKind::None => {}
        _ => counts.other += 1,
    });

    println!("Objects:");
    println!("  Xforms:  {}", counts.xform);
    println!(
        "  Meshes:  {} ({} vertices, {} faces, {} triangles)",
        counts.mesh, counts.total_verts, counts.total_faces, counts.total_tris
    );
    if counts.other > 0 {
        println!("  Other:   {} (not sampled)", counts.other);
    }
    println!();
    println!("Total objects: {}", session.objects().len());
    if stats.failed > 0 {
        println!("Failed to sample: {}", stats.failed);
    }
    Ok(())
}

fn cmd_tree(path: &str) -> Result<()> {
    let session = open(path, ImportSettings::load())?;
    println!("Archive: {}", path);
    println!();
    if let Some(root) = session.root() {
        print_tree(&session, root, 0);
    }
    Ok(())
}

fn print_tree(session: &Session, id: ObjectId, depth: usize) {
    let Some(obj) = session.object(id) else { return };
    let indent = "  ".repeat(depth);
    println!("{}{} [{}]", indent, obj.name(), obj.schema_kind().as_str());
    for &child in obj.children() {
        print_tree(session, child, depth + 1);
    }
}

struct MeshOptions {
    time: Chrono,
    max_vertices: Option<usize>,
    dump: bool,
}

fn parse_mesh_options(args: &[&str], settings: &mut ImportSettings) -> Result<MeshOptions> {
    let mut opts = MeshOptions { time: 0.0, max_vertices: None, dump: false };
    let mut it = args.iter();
    while let Some(&arg) = it.next() {
        match arg {
            "--time" => {
                let v = it.next().context("--time needs a value")?;
                opts.time = v.parse().with_context(|| format!("bad time: {}", v))?;
            }
            "--max-vertices" => {
                let v = it.next().context("--max-vertices needs a value")?;
                opts.max_vertices = Some(v.parse().with_context(|| format!("bad vertex count: {}", v))?);
            }
            "--no-triangulate" => settings.force_triangulate = false,
            "--swap-handedness" => settings.swap_handedness = true,
            "--swap-winding" => settings.swap_face_winding = true,
            "--normals" => {
                let v = it.next().context("--normals needs a value")?;
                settings.normal_mode = NormalMode::parse(v).with_context(|| format!("bad normal mode: {}", v))?;
            }
            "--dump" => opts.dump = true,
            other => bail!("unknown mesh option: {}", other),
        }
    }
    Ok(opts)
}

fn cmd_mesh(path: &str, object_path: &str, args: &[&str]) -> Result<()> {
    let mut settings = ImportSettings::load();
    let opts = parse_mesh_options(args, &mut settings)?;
    let max_vertices = opts.max_vertices.unwrap_or(settings.max_vertices_per_chunk);

    let mut session = open(path, settings)?;
    let id = session.find(object_path)?;
    let obj = session.object_mut(id).context("object vanished")?;
    obj.set_time(opts.time);
    let report = obj.update()?;
    debug!("Refresh: {:?}", report);

    let kind = obj.schema_kind();
    let Some(mesh) = obj.polymesh_mut() else {
        bail!("{} is a {}, not a mesh", object_path, kind.as_str());
    };
    mesh.prepare_submeshes(None);

    let flags = mesh.flags();
    println!("Mesh: {} @ t={}", object_path, opts.time);
    println!("  Variance:  {:?}", mesh.topology_variance());
    println!("  Flags:     mirror_x={} reverse_winding={} triangulate={}", flags.mirror_x, flags.reverse_winding, flags.triangulate);
    println!("  Faces:     {}", mesh.sample().num_faces());
    println!("  Vertices:  {}", mesh.vertex_count());
    println!("  Indices:   {}", mesh.index_count());
    let normals = match (mesh.has_normals(), mesh.has_output_normals()) {
        (true, true) if flags.normal_mode != NormalMode::AlwaysCompute => "file",
        (_, true) => "computed",
        (true, false) => "file, ignored",
        (false, false) => "no",
    };
    println!("  Normals:   {} ({})", normals, flags.normal_mode.as_str());
    println!("  UVs:       {}", if mesh.has_uvs() { "yes" } else { "no" });
    println!("  Velocity:  {}", if mesh.has_velocities() { "yes" } else { "no" });

    let buffers = mesh.build_buffers()?;
    if !buffers.bounds.is_empty() {
        let (c, s) = (buffers.bounds.center(), buffers.bounds.size());
        println!("  Center:    {:.4} {:.4} {:.4}", c.x, c.y, c.z);
        println!("  Size:      {:.4} {:.4} {:.4}", s.x, s.y, s.z);
    }
    println!();

    println!("Submeshes ({}):", mesh.submesh_count());
    for info in mesh.submesh_infos() {
        println!("  [{}] {} triangles, faceset {}", info.index, info.triangle_count, info.faceset_index);
    }
    println!();

    println!("Chunks (max {} vertices):", max_vertices);
    for chunk in mesh.split_chunks(max_vertices) {
        let chunk = chunk?;
        println!(
            "  faces {}..{}  vertices {}  indices {}",
            chunk.begin_face,
            chunk.end_face(),
            chunk.num_vertices,
            chunk.triangulated_index_count
        );
    }

    if opts.dump {
        let mut indices = vec![0u32; mesh.index_count()];
        mesh.copy_indices(&mut indices)?;
        let mut positions = vec![Vec3::ZERO; mesh.vertex_count()];
        mesh.copy_vertices(&mut positions)?;

        println!();
        println!("Positions:");
        for (i, p) in positions.iter().enumerate() {
            println!("  {:4}: {:>10.4} {:>10.4} {:>10.4}", i, p.x, p.y, p.z);
        }
        println!("Indices:");
        for tri in indices.chunks(if flags.triangulate { 3 } else { 12 }) {
            println!("  {:?}", tri);
        }
    }
    Ok(())
}

fn cmd_play(path: &str, range: &[&str]) -> Result<()> {
    let parse = |s: &str| s.parse::<Chrono>().with_context(|| format!("bad time: {}", s));
    let (from, to, step) = (parse(range[0])?, parse(range[1])?, parse(range[2])?);
    if step <= 0.0 {
        bail!("step must be positive");
    }

    let mut stream = Stream::open(path, ImportSettings::load()).with_context(|| format!("failed to open {}", path))?;
    let mut t = from;
    let mut refreshes = 0;
    while t <= to + step * 0.5 {
        match stream.update(t)? {
            Some(stats) => {
                refreshes += 1;
                println!("t={:8.3}  t'={:8.3}  refreshed {} objects ({} failed)", t, stream.sampled_time(), stats.updated, stats.failed);
            }
            None => println!("t={:8.3}  unchanged", t),
        }
        t += step;
    }
    println!();
    println!("Refreshes: {}", refreshes);
    Ok(())
}

fn cmd_pack(input: &str, output: &str) -> Result<()> {
    let text = std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input))?;
    let desc: SceneDesc = serde_json::from_str(&text).with_context(|| format!("{} is not a scene description", input))?;
    write_scene(Path::new(output), &desc, true)?;
    info!("Wrote {}", output);
    Ok(())
}

fn cmd_settings(args: &[&str]) -> Result<()> {
    let settings = match args.first().copied() {
        None => ImportSettings::load(),
        // rewrites the file with every field present
        Some("--save") => {
            let settings = ImportSettings::load();
            settings.save()?;
            settings
        }
        Some("--reset") => {
            let settings = ImportSettings::default();
            settings.save()?;
            settings
        }
        Some(other) => bail!("unknown settings option: {}", other),
    };
    match ImportSettings::path() {
        Some(p) if !args.is_empty() => info!("Wrote {}", p.display()),
        Some(p) => println!("# {}", p.display()),
        None => println!("# no config directory"),
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
