use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions};
use mongodb::{bson, Client, Collection, Database as MongoDatabase};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Database, DatabaseError};
use crate::types::operation::{OperationState, PendingOperation};
use crate::types::params::DatabaseArgs;
use crate::types::projection::{
    AuditEntry, CandidateRecord, ElectionMetadata, ElectionPhase, MirrorState, VoterRecord, VoterStatus,
};

const OPERATIONS_COLLECTION: &str = "operations";
const CANDIDATES_COLLECTION: &str = "candidates";
const METADATA_COLLECTION: &str = "election_metadata";
const VOTERS_COLLECTION: &str = "voters";
const AUDIT_COLLECTION: &str = "audit_logs";

pub trait ToDocument {
    fn to_document(&self) -> Result<Document, DatabaseError>;
}

impl<T: Serialize> ToDocument for T {
    fn to_document(&self) -> Result<Document, DatabaseError> {
        Ok(bson::to_document(self)?)
    }
}

/// MongoDB-backed mirror store.
pub struct MongoDbClient {
    database: MongoDatabase,
}

impl MongoDbClient {
    pub async fn new(args: &DatabaseArgs) -> Result<Self, DatabaseError> {
        let client = Client::with_uri_str(&args.connection_uri).await?;
        let database = client.database(&args.database_name);
        Ok(Self { database })
    }

    fn get_operations_collection(&self) -> Collection<PendingOperation> {
        self.database.collection(OPERATIONS_COLLECTION)
    }

    fn get_candidates_collection(&self) -> Collection<CandidateRecord> {
        self.database.collection(CANDIDATES_COLLECTION)
    }

    fn get_metadata_collection(&self) -> Collection<ElectionMetadata> {
        self.database.collection(METADATA_COLLECTION)
    }

    fn get_voters_collection(&self) -> Collection<VoterRecord> {
        self.database.collection(VOTERS_COLLECTION)
    }

    fn get_audit_collection(&self) -> Collection<AuditEntry> {
        self.database.collection(AUDIT_COLLECTION)
    }

    /// Case-insensitive exact match on an address field. Historic rows mix
    /// checksummed and lowercased hex, so equality filters cannot be literal.
    fn address_filter(field: &str, address: &str) -> Document {
        doc! { field: { "$regex": format!("^{}$", regex::escape(address)), "$options": "i" } }
    }

    async fn find<T>(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
        limit: Option<i64>,
    ) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let mut pipeline = vec![doc! { "$match": filter }];
        if let Some(sort) = sort {
            pipeline.push(doc! { "$sort": sort });
        }
        if let Some(limit) = limit {
            pipeline.push(doc! { "$limit": limit });
        }

        let cursor = self.database.collection::<Document>(collection).aggregate(pipeline, None).await?;
        cursor
            .map_err(DatabaseError::Driver)
            .and_then(|document| {
                futures::future::ready(bson::from_document::<T>(document).map_err(DatabaseError::Deserialize))
            })
            .try_collect()
            .await
    }
}

#[async_trait]
impl Database for MongoDbClient {
    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn create_operation(&self, operation: PendingOperation) -> Result<PendingOperation, DatabaseError> {
        let options = UpdateOptions::builder().upsert(true).build();

        // One row per transaction handle. The filter matches an existing row,
        // $setOnInsert only fires when there is none.
        let filter = doc! { "tx_handle": &operation.tx_handle };
        let updates = doc! { "$setOnInsert": operation.to_document()? };

        let result = self.get_operations_collection().update_one(filter, updates, options).await?;

        if result.matched_count == 0 {
            tracing::debug!(tx_handle = %operation.tx_handle, category = "db_call", "Pending operation recorded");
            Ok(operation)
        } else {
            Err(DatabaseError::ItemAlreadyExists(format!(
                "operation already exists for transaction {}",
                operation.tx_handle
            )))
        }
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn get_operation_by_handle(&self, tx_handle: &str) -> Result<Option<PendingOperation>, DatabaseError> {
        let filter = doc! { "tx_handle": tx_handle };
        Ok(self.get_operations_collection().find_one(filter, None).await?)
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn update_operation_state(
        &self,
        operation: &PendingOperation,
        state: OperationState,
    ) -> Result<PendingOperation, DatabaseError> {
        // The version in the filter is the optimistic lock. A concurrent
        // update bumps it and this call then matches nothing.
        let filter = doc! {
            "tx_handle": &operation.tx_handle,
            "version": operation.version,
        };
        let options = FindOneAndUpdateOptions::builder().upsert(false).return_document(ReturnDocument::After).build();
        let update = doc! {
            "$set": {
                "state": bson::to_bson(&state)?,
                "version": Bson::Int32(operation.version + 1),
                "updated_at": Bson::DateTime(Utc::now().round_subsecs(0).into()),
            }
        };

        match self.get_operations_collection().find_one_and_update(filter, update, options).await? {
            Some(updated) => {
                tracing::debug!(tx_handle = %updated.tx_handle, state = %updated.state, category = "db_call", "Operation state advanced");
                Ok(updated)
            }
            None => {
                tracing::warn!(tx_handle = %operation.tx_handle, category = "db_call", "Failed to advance operation. Version is likely outdated");
                Err(DatabaseError::UpdateFailed(format!(
                    "operation for transaction {} at version {}",
                    operation.tx_handle, operation.version
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn create_candidate(&self, candidate: CandidateRecord) -> Result<CandidateRecord, DatabaseError> {
        self.get_candidates_collection().insert_one(&candidate, None).await?;
        tracing::debug!(email = %candidate.email, category = "db_call", "Candidate mirrored");
        Ok(candidate)
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn get_candidates_by_election(&self, election_address: &str) -> Result<Vec<CandidateRecord>, DatabaseError> {
        let filter = Self::address_filter("electionAddress", election_address);
        self.find(CANDIDATES_COLLECTION, filter, None, None).await
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn get_candidate_by_email(
        &self,
        election_address: &str,
        email: &str,
    ) -> Result<Option<CandidateRecord>, DatabaseError> {
        let mut filter = Self::address_filter("electionAddress", election_address);
        filter.insert("email", email);
        Ok(self.get_candidates_collection().find_one(filter, None).await?)
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn set_candidate_mirror_state(&self, tx_handle: &str, state: MirrorState) -> Result<(), DatabaseError> {
        let filter = doc! { "txHash": tx_handle };
        let update = doc! {
            "$set": {
                "status": bson::to_bson(&state)?,
                "updatedAt": Bson::DateTime(Utc::now().round_subsecs(0).into()),
            }
        };
        self.get_candidates_collection().update_one(filter, update, None).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn count_candidates(&self, election_address: &str) -> Result<u64, DatabaseError> {
        let filter = Self::address_filter("electionAddress", election_address);
        Ok(self.get_candidates_collection().count_documents(filter, None).await?)
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn ensure_metadata(
        &self,
        election_address: &str,
        election_name: &str,
        election_desc: &str,
    ) -> Result<(), DatabaseError> {
        match self.get_metadata(election_address).await? {
            None => {
                let metadata = ElectionMetadata::open_defaults(
                    election_address.to_string(),
                    election_name.to_string(),
                    election_desc.to_string(),
                );
                self.get_metadata_collection().insert_one(&metadata, None).await?;
                tracing::debug!(election_address, category = "db_call", "Metadata seeded with open defaults");
            }
            // A row created by the schedule endpoint before the deployment
            // confirmed has no name yet. Backfill it.
            Some(existing) if existing.election_name.is_empty() => {
                let filter = Self::address_filter("election_address", election_address);
                let update = doc! {
                    "$set": { "election_name": election_name, "election_desc": election_desc }
                };
                self.get_metadata_collection().update_one(filter, update, None).await?;
            }
            Some(_) => {}
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn get_metadata(&self, election_address: &str) -> Result<Option<ElectionMetadata>, DatabaseError> {
        let filter = Self::address_filter("election_address", election_address);
        Ok(self.get_metadata_collection().find_one(filter, None).await?)
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn list_metadata(&self) -> Result<Vec<ElectionMetadata>, DatabaseError> {
        self.find(METADATA_COLLECTION, doc! {}, Some(doc! { "start_date": -1 }), None).await
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn set_schedule(
        &self,
        election_address: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let options = UpdateOptions::builder().upsert(true).build();
        let filter = doc! { "election_address": election_address };
        // $setOnInsert keeps a row inserted here deserializable before the
        // deployment confirmation backfills the name.
        let update = doc! {
            "$set": {
                "start_date": Bson::DateTime(start_date.into()),
                "end_date": Bson::DateTime(end_date.into()),
                "status": bson::to_bson(&ElectionPhase::Scheduled)?,
            },
            "$setOnInsert": {
                "election_address": election_address,
                "election_name": "",
                "election_desc": "",
            },
        };
        self.get_metadata_collection().update_one(filter, update, options).await?;
        tracing::debug!(election_address, category = "db_call", "Election schedule updated");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn end_election(&self, election_address: &str) -> Result<(), DatabaseError> {
        let now = Utc::now().round_subsecs(0);
        let options = UpdateOptions::builder().upsert(true).build();
        let filter = doc! { "election_address": election_address };
        let update = doc! {
            "$set": {
                "status": bson::to_bson(&ElectionPhase::Ended)?,
                "end_date": Bson::DateTime(now.into()),
            },
            "$setOnInsert": {
                "election_address": election_address,
                "election_name": "",
                "election_desc": "",
                "start_date": Bson::DateTime(now.into()),
            },
        };
        self.get_metadata_collection().update_one(filter, update, options).await?;
        tracing::debug!(election_address, category = "db_call", "Election marked as ended");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn find_addresses_with_prefix(&self, prefix: &str, limit: i64) -> Result<Vec<String>, DatabaseError> {
        let filter = doc! {
            "election_address": { "$regex": format!("^{}", regex::escape(prefix)), "$options": "i" }
        };
        let rows: Vec<ElectionMetadata> = self.find(METADATA_COLLECTION, filter, None, Some(limit)).await?;
        Ok(rows.into_iter().map(|row| row.election_address).collect())
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn enroll_voter(&self, voter: VoterRecord) -> Result<VoterRecord, DatabaseError> {
        let options = UpdateOptions::builder().upsert(true).build();

        let filter = doc! {
            "election_address": &voter.election_address,
            "email": &voter.email,
        };
        let updates = doc! { "$setOnInsert": voter.to_document()? };

        let result = self.get_voters_collection().update_one(filter, updates, options).await?;

        if result.matched_count == 0 {
            tracing::debug!(email = %voter.email, category = "db_call", "Voter enrolled");
            Ok(voter)
        } else {
            Err(DatabaseError::ItemAlreadyExists(format!(
                "voter {} is already enrolled for election {}",
                voter.email, voter.election_address
            )))
        }
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn get_voter(&self, election_address: &str, email: &str) -> Result<Option<VoterRecord>, DatabaseError> {
        let mut filter = Self::address_filter("election_address", election_address);
        filter.insert("email", email);
        Ok(self.get_voters_collection().find_one(filter, None).await?)
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn set_voter_status(
        &self,
        election_address: &str,
        email: &str,
        status: VoterStatus,
    ) -> Result<VoterRecord, DatabaseError> {
        let mut filter = Self::address_filter("election_address", election_address);
        filter.insert("email", email);
        let options = FindOneAndUpdateOptions::builder().upsert(false).return_document(ReturnDocument::After).build();
        let update = doc! {
            "$set": {
                "status": bson::to_bson(&status)?,
                "updated_at": Bson::DateTime(Utc::now().round_subsecs(0).into()),
            }
        };

        match self.get_voters_collection().find_one_and_update(filter, update, options).await? {
            Some(voter) => Ok(voter),
            None => Err(DatabaseError::NotFound(format!(
                "no voter {} enrolled for election {}",
                email, election_address
            ))),
        }
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn list_voters(&self, election_address: &str) -> Result<Vec<VoterRecord>, DatabaseError> {
        let filter = Self::address_filter("election_address", election_address);
        self.find(VOTERS_COLLECTION, filter, None, None).await
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn count_voters(&self, election_address: &str) -> Result<u64, DatabaseError> {
        let filter = Self::address_filter("election_address", election_address);
        Ok(self.get_voters_collection().count_documents(filter, None).await?)
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn append_audit(&self, entry: AuditEntry) -> Result<(), DatabaseError> {
        self.get_audit_collection().insert_one(&entry, None).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), ret, err)]
    async fn list_audit(&self, election_address: &str) -> Result<Vec<AuditEntry>, DatabaseError> {
        let filter = Self::address_filter("election_address", election_address);
        self.find(AUDIT_COLLECTION, filter, Some(doc! { "timestamp": 1 }), None).await
    }
}
