use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::error::AcoError;
use crate::graph::Node;

/// A parsed TSPLIB problem: node coordinates only. Distances are
/// derived later by the graph, unrounded, so precision is not lost to
/// the format's integer convention.
#[derive(Debug, Clone)]
pub struct TspInstance {
    pub name: String,
    pub comment: String,
    pub dimension: usize,
    pub nodes: Vec<Node>,
}

/// Loads a TSPLIB file with EUC_2D coordinates.
pub fn parse_tsp_file(file_path: &str) -> Result<TspInstance, AcoError> {
    let file = File::open(file_path)
        .map_err(|e| AcoError::Parse(format!("failed to open {file_path}: {e}")))?;
    parse_tsp(BufReader::new(file))
}

/// Parses TSPLIB content from any buffered reader. Only the EUC_2D
/// edge weight type is supported; explicit weight matrices are not.
pub fn parse_tsp(reader: impl BufRead) -> Result<TspInstance, AcoError> {
    let mut name = String::new();
    let mut comment = String::new();
    let mut dimension = 0;
    let mut edge_weight_type = String::new();
    let mut nodes: Vec<Node> = Vec::new();

    let mut reading_node_coords = false;
    let mut line_num = 0;

    for line_result in reader.lines() {
        line_num += 1;
        let line = line_result
            .map_err(|e| AcoError::Parse(format!("error reading line {line_num}: {e}")))?
            .trim()
            .to_string();

        if line == "EOF" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        if reading_node_coords {
            // Any follow-up section header ends the coordinate block.
            if line.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && line.split_whitespace().count() == 1
            {
                reading_node_coords = false;
            } else {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 3 {
                    return Err(AcoError::Parse(format!(
                        "L{line_num}: malformed node coord line: {line}"
                    )));
                }
                let id = parts[0].parse::<usize>().map_err(|e| {
                    AcoError::Parse(format!("L{line_num}: invalid node id: {e}"))
                })?;
                let x = parts[1].parse::<f64>().map_err(|e| {
                    AcoError::Parse(format!("L{line_num}: invalid x coord: {e}"))
                })?;
                let y = parts[2].parse::<f64>().map_err(|e| {
                    AcoError::Parse(format!("L{line_num}: invalid y coord: {e}"))
                })?;
                nodes.push(Node { id, x, y });
                if nodes.len() == dimension {
                    reading_node_coords = false;
                }
                continue;
            }
        }

        let parts: Vec<&str> = line.splitn(2, ':').map(|s| s.trim()).collect();
        if parts.len() == 2 {
            match parts[0] {
                "NAME" => name = parts[1].to_string(),
                "COMMENT" => comment = parts[1].to_string(),
                "DIMENSION" => {
                    dimension = parts[1].parse::<usize>().map_err(|e| {
                        AcoError::Parse(format!("L{line_num}: invalid dimension: {e}"))
                    })?
                }
                "EDGE_WEIGHT_TYPE" => edge_weight_type = parts[1].to_string(),
                _ => {} // Ignore other keywords
            }
        } else if line == "NODE_COORD_SECTION" {
            reading_node_coords = true;
        }
    }

    if dimension == 0 {
        return Err(AcoError::Parse("DIMENSION not found or is zero".into()));
    }
    if edge_weight_type != "EUC_2D" {
        return Err(AcoError::Parse(format!(
            "unsupported edge weight type: {edge_weight_type}"
        )));
    }
    if nodes.len() != dimension {
        return Err(AcoError::Parse(format!(
            "DIMENSION is {dimension} but found {} node coordinates",
            nodes.len()
        )));
    }

    Ok(TspInstance {
        name,
        comment,
        dimension,
        nodes,
    })
}
