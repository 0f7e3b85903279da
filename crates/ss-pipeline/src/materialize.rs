//! Final handoff: predictions joined with mesh coordinates.

use crate::error::{PipelineError, PipelineResult};
use crate::tables::{MaterializedRecord, MaterializedTable, Mesh, Predictions};

/// Join predictions with node coordinates, one table per requested
/// return period. Pure structural join; nodes whose fit failed are
/// listed in `failed_nodes` rather than emitted as zero-surge records.
pub fn materialize(
    predictions: &Predictions,
    mesh: &Mesh,
) -> PipelineResult<Vec<MaterializedTable>> {
    if mesh.node_count() != predictions.node_count() {
        return Err(PipelineError::MeshMismatch {
            mesh_nodes: mesh.node_count(),
            prediction_nodes: predictions.node_count(),
        });
    }

    let mut tables = Vec::with_capacity(predictions.periods.len());
    for (col, &period) in predictions.periods.iter().enumerate() {
        let mut records = Vec::with_capacity(mesh.node_count());
        let mut failed_nodes = Vec::new();
        for (node_index, row) in predictions.rows.iter().enumerate() {
            let node = mesh.node_id(node_index);
            match row {
                Some(values) => {
                    let coord = &mesh.coords[node_index];
                    records.push(MaterializedRecord {
                        node,
                        lon: coord.lon,
                        lat: coord.lat,
                        surge: values[col],
                    });
                }
                None => failed_nodes.push(node),
            }
        }
        tables.push(MaterializedTable {
            period,
            records,
            failed_nodes,
        });
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::NodeCoord;

    fn mesh_of(coords: &[(f64, f64)]) -> Mesh {
        Mesh {
            coords: coords
                .iter()
                .map(|&(lon, lat)| NodeCoord {
                    lon,
                    lat,
                    depth: 10.0,
                })
                .collect(),
        }
    }

    #[test]
    fn join_carries_coordinates_per_period() {
        let predictions = Predictions {
            periods: vec![10, 100],
            rows: vec![Some(vec![1.0, 2.0]), Some(vec![3.0, 4.0])],
        };
        let mesh = mesh_of(&[(110.1, 19.5), (110.2, 19.6)]);

        let tables = materialize(&predictions, &mesh).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].period, 10);
        assert_eq!(tables[0].records[1].surge, 3.0);
        assert_eq!(tables[0].records[1].lon, 110.2);
        assert_eq!(tables[1].period, 100);
        assert_eq!(tables[1].records[0].surge, 2.0);
        assert_eq!(tables[1].records[0].node.one_based(), 1);
    }

    #[test]
    fn failed_nodes_are_listed_not_zeroed() {
        let predictions = Predictions {
            periods: vec![50],
            rows: vec![Some(vec![1.2]), None, Some(vec![0.0])],
        };
        let mesh = mesh_of(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);

        let tables = materialize(&predictions, &mesh).unwrap();
        let table = &tables[0];
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.failed_nodes.len(), 1);
        assert_eq!(table.failed_nodes[0].one_based(), 2);
        // A legitimate zero prediction still materializes.
        assert_eq!(table.records[1].surge, 0.0);
        assert_eq!(table.records[1].node.one_based(), 3);
    }

    #[test]
    fn mesh_size_mismatch_is_structural() {
        let predictions = Predictions {
            periods: vec![10],
            rows: vec![Some(vec![1.0])],
        };
        let mesh = mesh_of(&[(0.0, 0.0), (1.0, 1.0)]);
        assert!(matches!(
            materialize(&predictions, &mesh).unwrap_err(),
            PipelineError::MeshMismatch {
                mesh_nodes: 2,
                prediction_nodes: 1
            }
        ));
    }
}
