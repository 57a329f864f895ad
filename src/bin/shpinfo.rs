//! Diagnostic: dump the header and per-record summary of a shapefile
use anyhow::{bail, Context};
use shp_tools_rs::{Geometry, Shapefile};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(p) => p,
        None => bail!("usage: shpinfo <file.shp>"),
    };

    let file = Shapefile::open(&path).with_context(|| format!("opening {path}"))?;
    print!("{}", file.header);
    println!("shapes:      {}", file.num_shapes());
    if let Some(prj) = &file.projection {
        println!("projection:  {}", prj.trim());
    }
    println!();

    for i in 0..file.num_shapes() {
        let shape = file.shape(i)?;
        let extent = shape.extent();
        print!(
            "  #{:<6} {:<12} {:>6} pts {:>4} parts",
            i,
            shape.shape_type.to_string(),
            shape.num_points(),
            shape.num_parts()
        );
        match shape.to_geometry() {
            Geometry::Empty => println!("  (null)"),
            Geometry::Polygon(p) => println!(
                "  1 shell, {} holes  [{}, {}]..[{}, {}]",
                p.holes.len(),
                extent.min_x,
                extent.min_y,
                extent.max_x,
                extent.max_y
            ),
            Geometry::MultiPolygon(polys) => println!(
                "  {} shells, {} holes  [{}, {}]..[{}, {}]",
                polys.len(),
                polys.iter().map(|p| p.holes.len()).sum::<usize>(),
                extent.min_x,
                extent.min_y,
                extent.max_x,
                extent.max_y
            ),
            _ => println!(
                "  [{}, {}]..[{}, {}]",
                extent.min_x, extent.min_y, extent.max_x, extent.max_y
            ),
        }
    }

    let total = file.extent();
    if !total.is_empty() {
        println!();
        println!("data extent: {total}");
    }
    Ok(())
}
