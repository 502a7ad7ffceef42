use milvus_client::{
    ClientConfig, CollectionMapping, CollectionMappingConfig, CollectionParams, DataType,
    FieldData, FieldSchema, InsertConfig, InsertParam, MetricType, MilvusClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // MILVUS_URL / MILVUS_TIMEOUT_SECS override the defaults
    let client = MilvusClient::from_config(&ClientConfig::from_env()?)?;

    // 1 Create a collection with caller-supplied ids
    let mapping = CollectionMapping::new(CollectionMappingConfig {
        collection_name: "example_collection".to_string(),
        fields: vec![
            FieldSchema::new("duration", DataType::Int32),
            FieldSchema::vector("embedding", DataType::FloatVector, 128)
                .with_metric(MetricType::L2),
        ],
        params_in_json: Some(
            CollectionParams {
                segment_row_count: Some(4096),
                auto_id: Some(false),
            }
            .to_json()?,
        ),
    })?;
    client.create_collection(&mapping).await?;
    println!("Created {}", mapping);

    // 2 Insert ten entities
    let ids: Vec<i64> = (1..=10).collect();
    let durations: Vec<i32> = ids.iter().map(|id| *id as i32 * 10).collect();
    let vectors: Vec<Vec<f32>> = ids
        .iter()
        .map(|id| generate_vector(128, *id as f32))
        .collect();
    let insert = InsertParam::new(InsertConfig {
        collection_name: mapping.collection_name().to_string(),
        fields: vec![
            FieldData::new("duration", durations),
            FieldData::new("embedding", vectors),
        ],
        entity_ids: ids,
        ..Default::default()
    })?;
    let inserted = client.insert(&insert).await?;
    println!("Inserted {} entities", inserted.len());

    // 3 Look up a mix of existing and missing ids
    let response = client
        .get_entity_by_id(mapping.collection_name(), &[3, 42, 7])
        .await?;
    if !response.ok() {
        println!("Lookup failed: {}", response.response().message());
        return Ok(());
    }
    for (id, fields) in response.valid_ids().iter().zip(response.fields_map()) {
        println!("Entity {}: duration = {:?}", id, fields.get("duration"));
    }

    Ok(())
}

fn generate_vector(dim: usize, seed: f32) -> Vec<f32> {
    let mut vector: Vec<f32> = (0..dim)
        .map(|i| ((seed * 1000.0 + i as f32) * 0.618).sin())
        .collect();
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}
