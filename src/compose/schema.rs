//! Tables and columns the templates read, with the alias each template
//! binds a table to. Fragments refer to columns through these constants.

use crate::predicate::ColumnRef;
use crate::sql::TableRef;

pub const SCHEMA: &str = "public";

/// `public.<table> AS <alias>`
pub fn table(name: &str, alias: &str) -> TableRef {
    TableRef::new(name).with_schema(SCHEMA).with_alias(alias)
}

/// Underpass changesets.
pub mod changesets {
    use super::ColumnRef;

    pub const TABLE: &str = "changesets";
    pub const ALIAS: &str = "c";

    pub const ID: ColumnRef = ColumnRef::new(ALIAS, "id");
    pub const USER_ID: ColumnRef = ColumnRef::new(ALIAS, "user_id");
    pub const CREATED_AT: ColumnRef = ColumnRef::new(ALIAS, "created_at");
    pub const UPDATED_AT: ColumnRef = ColumnRef::new(ALIAS, "updated_at");
    pub const HASHTAGS: ColumnRef = ColumnRef::new(ALIAS, "hashtags");
    pub const EDITOR: ColumnRef = ColumnRef::new(ALIAS, "editor");
    /// hstore of created feature counts.
    pub const ADDED: ColumnRef = ColumnRef::new(ALIAS, "added");
    /// hstore of modified feature counts.
    pub const MODIFIED: ColumnRef = ColumnRef::new(ALIAS, "modified");
    pub const BBOX: ColumnRef = ColumnRef::new(ALIAS, "bbox");
}

/// Underpass OSM users.
pub mod users {
    use super::ColumnRef;

    pub const TABLE: &str = "users";
    pub const ALIAS: &str = "u";

    pub const ID: ColumnRef = ColumnRef::new(ALIAS, "id");
    pub const USERNAME: ColumnRef = ColumnRef::new(ALIAS, "username");
}

/// Underpass validation results.
pub mod validation {
    use super::ColumnRef;

    pub const TABLE: &str = "validation";
    pub const ALIAS: &str = "v";

    pub const OSM_ID: ColumnRef = ColumnRef::new(ALIAS, "osm_id");
    pub const CHANGE_ID: ColumnRef = ColumnRef::new(ALIAS, "change_id");
    pub const USER_ID: ColumnRef = ColumnRef::new(ALIAS, "user_id");
    pub const STATUS: ColumnRef = ColumnRef::new(ALIAS, "status");
    pub const VALUES: ColumnRef = ColumnRef::new(ALIAS, "values");
    pub const SOURCE: ColumnRef = ColumnRef::new(ALIAS, "source");
    pub const LOCATION: ColumnRef = ColumnRef::new(ALIAS, "location");
    pub const TIMESTAMP: ColumnRef = ColumnRef::new(ALIAS, "timestamp");
}

/// Validation rows with `status` unnested, one row per issue.
pub mod issues {
    use super::ColumnRef;

    pub const ALIAS: &str = "vs";

    pub const STATUS: ColumnRef = ColumnRef::new(ALIAS, "status");
}

/// Tasking-manager task history.
pub mod task_history {
    use super::ColumnRef;

    pub const TABLE: &str = "task_history";
    pub const ALIAS: &str = "th";

    pub const PROJECT_ID: ColumnRef = ColumnRef::new(ALIAS, "project_id");
    pub const TASK_ID: ColumnRef = ColumnRef::new(ALIAS, "task_id");
    pub const USER_ID: ColumnRef = ColumnRef::new(ALIAS, "user_id");
    pub const ACTION: ColumnRef = ColumnRef::new(ALIAS, "action");
    pub const ACTION_TEXT: ColumnRef = ColumnRef::new(ALIAS, "action_text");
    pub const ACTION_DATE: ColumnRef = ColumnRef::new(ALIAS, "action_date");
}

/// Tasking-manager projects.
pub mod projects {
    use super::ColumnRef;

    pub const TABLE: &str = "projects";
    pub const ALIAS: &str = "p";

    pub const ID: ColumnRef = ColumnRef::new(ALIAS, "id");
    pub const STATUS: ColumnRef = ColumnRef::new(ALIAS, "status");
    pub const TOTAL_TASKS: ColumnRef = ColumnRef::new(ALIAS, "total_tasks");
    pub const TASKS_MAPPED: ColumnRef = ColumnRef::new(ALIAS, "tasks_mapped");
    pub const TASKS_VALIDATED: ColumnRef = ColumnRef::new(ALIAS, "tasks_validated");
    pub const ORGANISATION_ID: ColumnRef = ColumnRef::new(ALIAS, "organisation_id");
    pub const COUNTRY: ColumnRef = ColumnRef::new(ALIAS, "country");
    pub const CREATED: ColumnRef = ColumnRef::new(ALIAS, "created");
}

/// Tasking-manager tasks.
pub mod tasks {
    use super::ColumnRef;

    pub const TABLE: &str = "tasks";
    pub const ALIAS: &str = "tk";

    pub const ID: ColumnRef = ColumnRef::new(ALIAS, "id");
    pub const PROJECT_ID: ColumnRef = ColumnRef::new(ALIAS, "project_id");
    pub const VALIDATED_BY: ColumnRef = ColumnRef::new(ALIAS, "validated_by");
}

/// Tasking-manager organisations.
pub mod organisations {
    use super::ColumnRef;

    pub const TABLE: &str = "organisations";
    pub const ALIAS: &str = "o";

    pub const ID: ColumnRef = ColumnRef::new(ALIAS, "id");
    pub const NAME: ColumnRef = ColumnRef::new(ALIAS, "name");
}

/// Tasking-manager users.
pub mod tm_users {
    use super::ColumnRef;

    pub const TABLE: &str = "users";
    pub const ALIAS: &str = "tu";

    pub const ID: ColumnRef = ColumnRef::new(ALIAS, "id");
    pub const USERNAME: ColumnRef = ColumnRef::new(ALIAS, "username");
    pub const MAPPING_LEVEL: ColumnRef = ColumnRef::new(ALIAS, "mapping_level");
}

/// Training events.
pub mod training {
    use super::ColumnRef;

    pub const TABLE: &str = "training";
    pub const ALIAS: &str = "t";

    pub const TID: ColumnRef = ColumnRef::new(ALIAS, "tid");
    pub const NAME: ColumnRef = ColumnRef::new(ALIAS, "name");
    pub const LOCATION: ColumnRef = ColumnRef::new(ALIAS, "location");
    pub const ORGANIZATION: ColumnRef = ColumnRef::new(ALIAS, "organization");
    pub const EVENT_TYPE: ColumnRef = ColumnRef::new(ALIAS, "eventtype");
    pub const TOPIC_TYPE: ColumnRef = ColumnRef::new(ALIAS, "topictype");
    pub const TOPICS: ColumnRef = ColumnRef::new(ALIAS, "topics");
    pub const HOURS: ColumnRef = ColumnRef::new(ALIAS, "hours");
    pub const DATE: ColumnRef = ColumnRef::new(ALIAS, "date");
}

/// Organisations running trainings.
pub mod organizations {
    use super::ColumnRef;

    pub const TABLE: &str = "organizations";
    pub const ALIAS: &str = "org";

    pub const OID: ColumnRef = ColumnRef::new(ALIAS, "oid");
    pub const NAME: ColumnRef = ColumnRef::new(ALIAS, "name");
}

pub mod hashtag {
    use super::ColumnRef;

    pub const TABLE: &str = "hashtag";
    pub const ALIAS: &str = "h";

    pub const ID: ColumnRef = ColumnRef::new(ALIAS, "id");
    pub const NAME: ColumnRef = ColumnRef::new(ALIAS, "name");
}

/// Per-period hashtag statistics.
pub mod hashtag_stats {
    use super::ColumnRef;

    pub const TABLE: &str = "hashtag_stats";
    pub const ALIAS: &str = "hs";

    pub const HASHTAG_ID: ColumnRef = ColumnRef::new(ALIAS, "hashtag_id");
    /// Frequency code: w, m, q or y.
    pub const TYPE: ColumnRef = ColumnRef::new(ALIAS, "type");
    pub const START_DATE: ColumnRef = ColumnRef::new(ALIAS, "start_date");
    pub const END_DATE: ColumnRef = ColumnRef::new(ALIAS, "end_date");
    pub const TOTAL_NEW_BUILDINGS: ColumnRef = ColumnRef::new(ALIAS, "total_new_buildings");
    pub const TOTAL_UQ_CONTRIBUTORS: ColumnRef = ColumnRef::new(ALIAS, "total_uq_contributors");
    pub const TOTAL_NEW_ROAD_M: ColumnRef = ColumnRef::new(ALIAS, "total_new_road_m");
    pub const TOTAL_NEW_AMENITY: ColumnRef = ColumnRef::new(ALIAS, "total_new_amenity");
    pub const TOTAL_NEW_PLACES: ColumnRef = ColumnRef::new(ALIAS, "total_new_places");
}

/// Country boundaries.
pub mod countries {
    use super::ColumnRef;

    pub const TABLE: &str = "countries";
    pub const ALIAS: &str = "b";

    pub const ISO3: ColumnRef = ColumnRef::new(ALIAS, "iso3");
    pub const NAME: ColumnRef = ColumnRef::new(ALIAS, "name");
    pub const BOUNDARY: ColumnRef = ColumnRef::new(ALIAS, "boundary");
}
