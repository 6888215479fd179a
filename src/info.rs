//! # File Information Module
//!
//! Inspects GRIB2 and NetCDF files: submessage listings for GRIB2,
//! dimensions, variables and attributes for NetCDF.

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::source::{GribSource, SubmessageSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Grib2,
    Netcdf,
}

/// Sniffs the format from the leading magic bytes.
pub fn detect_format(path: &Path) -> Result<FileFormat> {
    let mut magic = [0u8; 4];
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let n = file
        .read(&mut magic)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match &magic[..n] {
        b"GRIB" => Ok(FileFormat::Grib2),
        [b'C', b'D', b'F', 1 | 2 | 5] | [0x89, b'H', b'D', b'F'] => Ok(FileFormat::Netcdf),
        _ => bail!(
            "{} is neither GRIB2 nor NetCDF (unrecognized header)",
            path.display()
        ),
    }
}

/// Information about a NetCDF dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetCdfDimensionInfo {
    pub name: String,
    pub length: usize,
    pub is_unlimited: bool,
}

/// Information about a NetCDF variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetCdfVariableInfo {
    pub name: String,
    pub data_type: String,
    pub dimensions: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub shape: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetCdfInfo {
    pub dimensions: Vec<NetCdfDimensionInfo>,
    pub variables: Vec<NetCdfVariableInfo>,
    pub global_attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GribInfo {
    pub submessages: Vec<SubmessageSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum FileContents {
    Grib2(GribInfo),
    Netcdf(NetCdfInfo),
}

/// Everything `info` reports about one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub file_size: Option<u64>,
    pub contents: FileContents,
}

/// Inspects a GRIB2 or NetCDF file.
///
/// `variable` narrows the listing to one GRIB2 short name or NetCDF variable.
/// `detailed` adds NetCDF global attributes.
pub fn get_file_info(path: &Path, variable: Option<&str>, detailed: bool) -> Result<FileInfo> {
    let format = detect_format(path)?;
    debug!("Detected {:?} for {}", format, path.display());
    let file_size = std::fs::metadata(path).ok().map(|m| m.len());

    let contents = match format {
        FileFormat::Grib2 => FileContents::Grib2(grib_info(path, variable)?),
        FileFormat::Netcdf => FileContents::Netcdf(netcdf_info(path, variable, detailed)?),
    };

    Ok(FileInfo {
        path: path.display().to_string(),
        file_size,
        contents,
    })
}

fn grib_info(path: &Path, variable: Option<&str>) -> Result<GribInfo> {
    let source = GribSource::open(path)
        .with_context(|| format!("Failed to open GRIB2 file: {}", path.display()))?;
    let submessages = source
        .submessages()
        .into_iter()
        .filter(|s| match variable {
            Some(name) => s
                .short_name
                .as_deref()
                .is_some_and(|short| short.eq_ignore_ascii_case(name)),
            None => true,
        })
        .collect();
    Ok(GribInfo { submessages })
}

fn netcdf_info(path: &Path, variable: Option<&str>, detailed: bool) -> Result<NetCdfInfo> {
    let file = netcdf::open(path)
        .with_context(|| format!("Failed to open NetCDF file: {}", path.display()))?;

    let dimensions = file
        .dimensions()
        .map(|dim| NetCdfDimensionInfo {
            name: dim.name().to_string(),
            length: dim.len(),
            is_unlimited: dim.is_unlimited(),
        })
        .collect();

    let mut variables = Vec::new();
    for var in file.variables() {
        if variable.is_some_and(|name| var.name() != name) {
            continue;
        }
        let attributes = var
            .attributes()
            .filter_map(|attr| {
                let value = attr.value().ok()?;
                Some((attr.name().to_string(), format!("{:?}", value)))
            })
            .collect();
        variables.push(NetCdfVariableInfo {
            name: var.name().to_string(),
            data_type: format!("{:?}", var.vartype()),
            dimensions: var.dimensions().iter().map(|d| d.name().to_string()).collect(),
            attributes,
            shape: var.dimensions().iter().map(|d| d.len()).collect(),
        });
    }

    let global_attributes = if detailed {
        file.attributes()
            .filter_map(|attr| {
                let value = attr.value().ok()?;
                Some((attr.name().to_string(), format!("{:?}", value)))
            })
            .collect()
    } else {
        BTreeMap::new()
    };

    Ok(NetCdfInfo {
        dimensions,
        variables,
        global_attributes,
    })
}

pub fn print_file_info_human(info: &FileInfo) {
    println!("File: {}", info.path);
    if let Some(size) = info.file_size {
        println!("  File Size: {:.2} MB", size as f64 / 1_048_576.0);
    }
    match &info.contents {
        FileContents::Grib2(grib) => {
            println!("  Format: GRIB2");
            println!("  Submessages: {} total", grib.submessages.len());
            for s in &grib.submessages {
                let shape = s
                    .shape
                    .map(|(ni, nj)| format!("{}x{}", ni, nj))
                    .unwrap_or_else(|| "?".to_string());
                println!(
                    "    {:>6}  {:<6} {:<24} lead {:<10} grid {}",
                    s.index,
                    s.short_name.as_deref().unwrap_or("-"),
                    s.level.as_deref().unwrap_or("-"),
                    s.lead_time.as_deref().unwrap_or("-"),
                    shape
                );
            }
        }
        FileContents::Netcdf(nc) => {
            println!("  Format: NetCDF");
            println!("  Dimensions: {} total", nc.dimensions.len());
            for dim in &nc.dimensions {
                println!(
                    "    {} ({}{})",
                    dim.name,
                    dim.length,
                    if dim.is_unlimited { ", unlimited" } else { "" }
                );
            }
            println!("  Variables: {} total", nc.variables.len());
            for var in &nc.variables {
                println!(
                    "    {} ({}) - dimensions: [{}]",
                    var.name,
                    var.data_type,
                    var.dimensions.join(", ")
                );
                for (name, value) in &var.attributes {
                    println!("      @{}: {}", name, value);
                }
            }
            if !nc.global_attributes.is_empty() {
                println!("  Global Attributes:");
                for (name, value) in &nc.global_attributes {
                    println!("    @{}: {}", name, value);
                }
            }
        }
    }
}

pub fn print_file_info_json(info: &FileInfo) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(info)?);
    Ok(())
}

pub fn print_file_info_yaml(info: &FileInfo) -> Result<()> {
    let yaml = serde_yaml::to_string(info).context("Failed to serialize file info to YAML")?;
    println!("{}", yaml);
    Ok(())
}

/// One row per submessage (GRIB2) or per variable (NetCDF).
pub fn file_info_csv(info: &FileInfo) -> String {
    let mut out = String::new();
    match &info.contents {
        FileContents::Grib2(grib) => {
            out.push_str("index,short_name,discipline,category,number,level,lead_time,ni,nj\n");
            for s in &grib.submessages {
                let (ni, nj) = s
                    .shape
                    .map(|(ni, nj)| (ni.to_string(), nj.to_string()))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "{},{},{},{},{},\"{}\",\"{}\",{},{}\n",
                    s.index,
                    s.short_name.as_deref().unwrap_or(""),
                    s.discipline,
                    s.category.map(|c| c.to_string()).unwrap_or_default(),
                    s.number.map(|n| n.to_string()).unwrap_or_default(),
                    s.level.as_deref().unwrap_or(""),
                    s.lead_time.as_deref().unwrap_or(""),
                    ni,
                    nj
                ));
            }
        }
        FileContents::Netcdf(nc) => {
            out.push_str("variable_name,data_type,dimensions,shape,attributes_count\n");
            for var in &nc.variables {
                let shape: Vec<String> = var.shape.iter().map(|s| s.to_string()).collect();
                out.push_str(&format!(
                    "{},{},\"{}\",\"{}\",{}\n",
                    var.name,
                    var.data_type,
                    var.dimensions.join(";"),
                    shape.join(";"),
                    var.attributes.len()
                ));
            }
        }
    }
    out
}

pub fn print_file_info_csv(info: &FileInfo) -> Result<()> {
    print!("{}", file_info_csv(info));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_tile(path: &Path) {
        let mut file = netcdf::create(path).unwrap();
        file.add_attribute("title", "test tile").unwrap();
        file.add_dimension("Time", 1).unwrap();
        file.add_dimension("yaxis_1", 2).unwrap();
        file.add_dimension("xaxis_1", 2).unwrap();
        let mut var = file
            .add_variable::<f64>("snodl", &["Time", "yaxis_1", "xaxis_1"])
            .unwrap();
        var.put_attribute("units", "mm").unwrap();
        var.put_values(&[1.0, 2.0, 3.0, 4.0], ..).unwrap();
        file.add_variable::<f64>("geolat", &["yaxis_1", "xaxis_1"]).unwrap();
    }

    #[test]
    fn test_detect_format() {
        let dir = tempdir().unwrap();
        let grib = dir.path().join("a.grib2");
        std::fs::write(&grib, b"GRIB\0\0\0\x02").unwrap();
        assert_eq!(detect_format(&grib).unwrap(), FileFormat::Grib2);

        let nc = dir.path().join("a.nc");
        write_tile(&nc);
        assert_eq!(detect_format(&nc).unwrap(), FileFormat::Netcdf);

        let text = dir.path().join("a.txt");
        std::fs::write(&text, "hello").unwrap();
        assert!(detect_format(&text).is_err());
        assert!(detect_format(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_netcdf_info_and_csv() {
        let dir = tempdir().unwrap();
        let nc = dir.path().join("sfc.tile1.nc");
        write_tile(&nc);

        let info = get_file_info(&nc, None, true).unwrap();
        let FileContents::Netcdf(contents) = &info.contents else {
            panic!("Expected NetCDF contents");
        };
        assert_eq!(contents.dimensions.len(), 3);
        assert_eq!(contents.variables.len(), 2);
        assert!(contents.global_attributes.contains_key("title"));
        let snodl = contents.variables.iter().find(|v| v.name == "snodl").unwrap();
        assert_eq!(snodl.shape, vec![1, 2, 2]);
        assert!(snodl.attributes.contains_key("units"));

        let csv = file_info_csv(&info);
        assert!(csv.starts_with("variable_name,"));
        assert!(csv.contains("snodl,"));
        assert_eq!(csv.lines().count(), 3);

        let filtered = get_file_info(&nc, Some("geolat"), false).unwrap();
        let FileContents::Netcdf(contents) = &filtered.contents else {
            panic!("Expected NetCDF contents");
        };
        assert_eq!(contents.variables.len(), 1);
        assert!(contents.global_attributes.is_empty());
    }
}
