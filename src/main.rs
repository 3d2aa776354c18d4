use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use meshview::ViewerConfig;

/// Interactive viewer for textured triangle meshes.
///
/// Drag with the left mouse button to rotate, scroll to zoom.
/// S swaps the Y and Z axes, T toggles the texture, R resets the view.
/// Drop an .obj/.stl file or an image onto the window to replace the mesh or texture.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Mesh file to open (.obj or .stl)
    mesh: Option<PathBuf>,

    /// Texture image to apply to the mesh
    #[arg(short, long)]
    texture: Option<PathBuf>,

    /// Swap the Y and Z axes of the mesh
    #[arg(long)]
    swap_yz: bool,

    /// Start with depth shading instead of the texture
    #[arg(long)]
    no_texture: bool,

    /// Vertical field of view in degrees, between 1 and 179
    #[arg(long, default_value_t = 60.0, value_parser = parse_fov)]
    fov: f32,

    /// Window width in logical pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn parse_fov(arg: &str) -> Result<f32, String> {
    let fov: f32 = arg.parse().map_err(|e| format!("{e}"))?;
    if (1.0..=179.0).contains(&fov) {
        Ok(fov)
    } else {
        Err(format!("field of view must be between 1 and 179 degrees, got {fov}"))
    }
}

impl Args {
    fn config(self) -> ViewerConfig {
        let mut config = ViewerConfig::new()
            .size(self.width, self.height)
            .fov(self.fov)
            .swap_axes(self.swap_yz)
            .show_texture(!self.no_texture);
        if let Some(mesh) = self.mesh {
            config = config.mesh(mesh);
        }
        if let Some(texture) = self.texture {
            config = config.texture(texture);
        }
        config
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("meshview=info")),
        )
        .init();

    let args = Args::parse();
    meshview::run(args.config())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fov_defaults_to_sixty() {
        let args = Args::try_parse_from(["meshview"]).unwrap();
        assert_eq!(args.fov, 60.0);
    }

    #[test]
    fn fov_out_of_range_is_rejected() {
        for fov in ["0", "-10", "180", "360", "NaN", "wide"] {
            assert!(
                Args::try_parse_from(["meshview", "--fov", fov]).is_err(),
                "accepted --fov {fov}"
            );
        }
    }

    #[test]
    fn fov_in_range_is_accepted() {
        let args = Args::try_parse_from(["meshview", "--fov", "179"]).unwrap();
        assert_eq!(args.config().fov, 179.0);
    }

    #[test]
    fn flags_map_onto_config() {
        let args =
            Args::try_parse_from(["meshview", "cube.obj", "--swap-yz", "--no-texture"]).unwrap();
        let config = args.config();
        assert!(config.swap_axes);
        assert!(!config.show_texture);
        assert_eq!(config.mesh.as_deref(), Some(std::path::Path::new("cube.obj")));
    }
}
