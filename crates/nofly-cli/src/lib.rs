//! nofly CLI - plan a route from a GeoJSON request document.
//!
//! The `nofly-route` binary reads a `FeatureCollection` with `start_point`,
//! `finish_point` and optional `restricted_polygons` features and prints the
//! route as a GeoJSON `LineString` feature.

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use nofly_core::{interchange, Ellipsoid, RouteOptions, RouteRequest, SearchStrategy};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Request document, or `-` for stdin
    #[arg(long, default_value = "-")]
    pub input: String,

    /// Reference ellipsoid (WGS84, GRS80, clrk66, ...)
    #[arg(long, default_value = "WGS84")]
    pub ellipsoid: String,

    /// Buffer distance in metres; overrides the document's `buffer_distance`
    #[arg(long)]
    pub buffer: Option<f64>,

    /// Use A* instead of Dijkstra
    #[arg(long)]
    pub astar: bool,

    /// Fail when the visibility graph would exceed this many vertices
    #[arg(long)]
    pub max_vertices: Option<usize>,

    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,
}

impl Args {
    pub fn route_options(&self) -> Result<RouteOptions> {
        let ellipsoid: Ellipsoid = self.ellipsoid.parse()?;
        let strategy = if self.astar {
            SearchStrategy::AStar
        } else {
            SearchStrategy::Dijkstra
        };
        Ok(RouteOptions {
            ellipsoid,
            strategy,
            max_vertices: self.max_vertices,
            ..RouteOptions::default()
        })
    }
}

pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading request from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("reading request from {input}"))
    }
}

/// Plan a route for `document` and render the response feature.
pub fn plan(args: &Args, document: &str) -> Result<String> {
    let mut request =
        RouteRequest::from_json(document).context("invalid route request")?;
    if args.buffer.is_some() {
        request.buffer_distance_m = args.buffer;
    }
    let options = args.route_options()?;
    tracing::info!(
        ellipsoid = %options.ellipsoid,
        strategy = ?options.strategy,
        buffer_m = request.buffer_distance_m,
        "planning route"
    );

    let path = request.route(&options)?;
    tracing::info!(
        points = path.points.len(),
        distance_m = path.distance_m,
        direct = path.is_direct(),
        "route planned"
    );

    let feature = interchange::route_feature(&path);
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&feature)?
    } else {
        serde_json::to_string(&feature)?
    };
    Ok(rendered)
}
