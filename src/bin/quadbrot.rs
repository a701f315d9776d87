// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate failure;
extern crate quadbrot;
extern crate tracing_subscriber;

use clap::{App, Arg, ArgMatches};
use failure::{format_err, Error, Fail};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

use quadbrot::bigfixed::BigFixed;
use quadbrot::{configure, render, RenderRequest};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_coordinate(s: &str) -> Result<(), String> {
    BigFixed::parse(s, 64).map(|_| ()).map_err(|e| e.to_string())
}

fn validate_diverge(s: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(d) if d.is_finite() && d > 0.0 => Ok(()),
        Ok(_) => Err("Diverge limit must be positive and finite".to_string()),
        Err(_) => Err("Could not parse diverge limit".to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const RMIN: &str = "rmin";
const RMAX: &str = "rmax";
const IMIN: &str = "imin";
const IMAX: &str = "imax";
const ITERATIONS: &str = "iterations";
const DIVERGE: &str = "diverge";
const RENDER: &str = "render";
const NUMERICS: &str = "numerics";
const PALETTE: &str = "palette";
const JOBS: &str = "jobs";
const COLLAPSE: &str = "collapse";
const GLITCH: &str = "glitch";
const GLITCH_SAMPLES: &str = "glitch-samples";
const GLITCH_SEED: &str = "glitch-seed";
const PRECISION: &str = "precision";
const NO_FIX_ASPECT: &str = "no-fix-aspect";
const VERBOSE: &str = "verbose";

fn coordinate_arg<'a, 'b>(name: &'a str, help: &'a str) -> Arg<'a, 'b> {
    Arg::with_name(name)
        .long(name)
        .takes_value(true)
        .allow_hyphen_values(true)
        .validator(|s| validate_coordinate(&s))
        .help(help)
}

fn args<'a>() -> ArgMatches<'a> {
    App::new("quadbrot")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot renderer with concurrent adaptive region subdivision")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the format follows the extension"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_pair::<u32>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(coordinate_arg(RMIN, "Real minimum of the plane window [default: -2.01]"))
        .arg(coordinate_arg(RMAX, "Real maximum of the plane window [default: 0.59]"))
        .arg(coordinate_arg(IMIN, "Imaginary minimum of the plane window [default: -1.11]"))
        .arg(coordinate_arg(IMAX, "Imaginary maximum of the plane window [default: 1.11]"))
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("255")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        255,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 255",
                    )
                })
                .help("Iterations before a point is considered bounded"),
        )
        .arg(
            Arg::with_name(DIVERGE)
                .long(DIVERGE)
                .short("d")
                .takes_value(true)
                .default_value("4.0")
                .validator(|s| validate_diverge(&s))
                .help("Escape threshold for |z|^2"),
        )
        .arg(
            Arg::with_name(RENDER)
                .long(RENDER)
                .short("r")
                .takes_value(true)
                .default_value("auto")
                .possible_values(&["auto", "sequence", "region", "concurrent"])
                .help("Render strategy"),
        )
        .arg(
            Arg::with_name(NUMERICS)
                .long(NUMERICS)
                .short("n")
                .takes_value(true)
                .default_value("auto")
                .possible_values(&["auto", "native", "bigfloat"])
                .help("Numeric system"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .long(PALETTE)
                .short("p")
                .takes_value(true)
                .default_value("pretty")
                .possible_values(&["grayscale", "redscale", "pretty"])
                .help("Colour palette"),
        )
        .arg(
            Arg::with_name(JOBS)
                .long(JOBS)
                .short("j")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        65535,
                        "Could not parse job count",
                        "Job count must be between 1 and 65535",
                    )
                })
                .help("Number of worker threads [default: number of CPUs]"),
        )
        .arg(
            Arg::with_name(COLLAPSE)
                .long(COLLAPSE)
                .short("c")
                .takes_value(true)
                .default_value("8")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        u32::MAX,
                        "Could not parse collapse threshold",
                        "Collapse threshold out of range",
                    )
                })
                .help("Regions this many pixels across or fewer are evaluated pixel by pixel"),
        )
        .arg(
            Arg::with_name(GLITCH)
                .long(GLITCH)
                .takes_value(true)
                .default_value("curve")
                .possible_values(&["off", "diagonal", "curve", "scatter"])
                .help("Pattern of the extra samples taken before painting a region flat"),
        )
        .arg(
            Arg::with_name(GLITCH_SAMPLES)
                .long(GLITCH_SAMPLES)
                .takes_value(true)
                .default_value("4")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        4096,
                        "Could not parse glitch sample count",
                        "Glitch sample count must be between 0 and 4096",
                    )
                })
                .help("Number of extra samples per region"),
        )
        .arg(
            Arg::with_name(GLITCH_SEED)
                .long(GLITCH_SEED)
                .takes_value(true)
                .default_value("0")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        u64::MAX,
                        "Could not parse glitch seed",
                        "Glitch seed out of range",
                    )
                })
                .help("Seed for the scatter pattern"),
        )
        .arg(
            Arg::with_name(PRECISION)
                .long(PRECISION)
                .takes_value(true)
                .default_value("128")
                .validator(|s| {
                    validate_range(
                        &s,
                        8,
                        4096,
                        "Could not parse precision",
                        "Precision must be between 8 and 4096 bits",
                    )
                })
                .help("Fractional bits for big number renders"),
        )
        .arg(
            Arg::with_name(NO_FIX_ASPECT)
                .long(NO_FIX_ASPECT)
                .help("Do not widen the plane window to match the image's aspect ratio"),
        )
        .arg(
            Arg::with_name(VERBOSE)
                .short("v")
                .multiple(true)
                .help("Log more; repeat for more detail"),
        )
        .get_matches()
}

fn value<T>(matches: &ArgMatches, name: &str, fallback: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Fail,
{
    match matches.value_of(name) {
        Some(s) => Ok(s.parse::<T>()?),
        None => Ok(fallback),
    }
}

fn request(matches: &ArgMatches) -> Result<RenderRequest, Error> {
    let defaults = RenderRequest::default();
    let size = matches.value_of(SIZE).unwrap_or("800x600");
    let (width, height) =
        parse_pair::<u32>(size, 'x').ok_or_else(|| format_err!("Could not parse image size {}", size))?;
    let corner = |name: &str, fallback: &String| matches.value_of(name).map_or_else(|| fallback.clone(), String::from);

    Ok(RenderRequest {
        iterate_limit: value(matches, ITERATIONS, defaults.iterate_limit)?,
        diverge_limit: value(matches, DIVERGE, defaults.diverge_limit)?,
        width,
        height,
        real_min: corner(RMIN, &defaults.real_min),
        real_max: corner(RMAX, &defaults.real_max),
        imag_min: corner(IMIN, &defaults.imag_min),
        imag_max: corner(IMAX, &defaults.imag_max),
        render: value(matches, RENDER, defaults.render)?,
        numerics: value(matches, NUMERICS, defaults.numerics)?,
        palette: value(matches, PALETTE, defaults.palette)?,
        jobs: value(matches, JOBS, defaults.jobs)?,
        collapse: value(matches, COLLAPSE, defaults.collapse)?,
        glitch: value(matches, GLITCH, defaults.glitch)?,
        glitch_samples: value(matches, GLITCH_SAMPLES, defaults.glitch_samples)?,
        glitch_seed: value(matches, GLITCH_SEED, defaults.glitch_seed)?,
        precision: value(matches, PRECISION, defaults.precision)?,
        fix_aspect: !matches.is_present(NO_FIX_ASPECT),
    })
}

fn init_logging(verbosity: u64) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let config = configure(&request(matches)?)?;
    let image = render(&config)?;
    let output = matches
        .value_of(OUTPUT)
        .ok_or_else(|| format_err!("No output file given"))?;
    image.save(output)?;
    Ok(())
}

fn main() {
    let matches = args();
    init_logging(matches.occurrences_of(VERBOSE));
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
