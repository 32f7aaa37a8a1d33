use async_trait::async_trait;

use crate::connectors::{RecordSource, SourceType};
use crate::utils::{
    error::EngineResult,
    types::{Address, Company, Geo, Record},
};

/// In-memory record source with deterministic data, for tests and demos
#[derive(Debug, Clone)]
pub struct MemorySource {
    records: Vec<Record>,
}

impl MemorySource {
    /// Create a source over the given records
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Create a source over the built-in ten-user dataset
    pub fn with_sample_data() -> Self {
        Self::new(sample_records())
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn load_all(&self) -> EngineResult<Vec<Record>> {
        Ok(self.records.clone())
    }

    fn source_type(&self) -> SourceType {
        SourceType::Memory
    }

    fn describe(&self) -> String {
        format!("memory:{} records", self.records.len())
    }
}

struct SampleUser {
    id: i64,
    name: &'static str,
    username: &'static str,
    email: &'static str,
    street: &'static str,
    suite: &'static str,
    city: &'static str,
    zipcode: &'static str,
    lat: &'static str,
    lng: &'static str,
    phone: &'static str,
    website: &'static str,
    company: &'static str,
    catch_phrase: &'static str,
    bs: &'static str,
}

impl From<&SampleUser> for Record {
    fn from(user: &SampleUser) -> Self {
        Record {
            id: user.id,
            name: Some(user.name.to_string()),
            username: Some(user.username.to_string()),
            email: Some(user.email.to_string()),
            address: Some(Address {
                street: Some(user.street.to_string()),
                suite: Some(user.suite.to_string()),
                city: Some(user.city.to_string()),
                zipcode: Some(user.zipcode.to_string()),
                geo: Some(Geo {
                    lat: Some(user.lat.to_string()),
                    lng: Some(user.lng.to_string()),
                }),
            }),
            phone: Some(user.phone.to_string()),
            website: Some(user.website.to_string()),
            company: Some(Company {
                name: Some(user.company.to_string()),
                catch_phrase: Some(user.catch_phrase.to_string()),
                bs: Some(user.bs.to_string()),
            }),
        }
    }
}

const SAMPLE_USERS: &[SampleUser] = &[
    SampleUser {
        id: 1,
        name: "Leanne Graham",
        username: "Bret",
        email: "Sincere@april.biz",
        street: "Kulas Light",
        suite: "Apt. 556",
        city: "Gwenborough",
        zipcode: "92998-3874",
        lat: "-37.3159",
        lng: "81.1496",
        phone: "1-770-736-8031 x56442",
        website: "hildegard.org",
        company: "Romaguera-Crona",
        catch_phrase: "Multi-layered client-server neural-net",
        bs: "harness real-time e-markets",
    },
    SampleUser {
        id: 2,
        name: "Ervin Howell",
        username: "Antonette",
        email: "Shanna@melissa.tv",
        street: "Victor Plains",
        suite: "Suite 879",
        city: "Wisokyburgh",
        zipcode: "90566-7771",
        lat: "-43.9509",
        lng: "-34.4618",
        phone: "010-692-6593 x09125",
        website: "anastasia.net",
        company: "Deckow-Crist",
        catch_phrase: "Proactive didactic contingency",
        bs: "synergize scalable supply-chains",
    },
    SampleUser {
        id: 3,
        name: "Clementine Bauch",
        username: "Samantha",
        email: "Nathan@yesenia.net",
        street: "Douglas Extension",
        suite: "Suite 847",
        city: "McKenziehaven",
        zipcode: "59590-4157",
        lat: "-68.6102",
        lng: "-47.0653",
        phone: "1-463-123-4447",
        website: "ramiro.info",
        company: "Romaguera-Jacobson",
        catch_phrase: "Face to face bifurcated interface",
        bs: "e-enable strategic applications",
    },
    SampleUser {
        id: 4,
        name: "Patricia Lebsack",
        username: "Karianne",
        email: "Julianne.OConner@kory.org",
        street: "Hoeger Mall",
        suite: "Apt. 692",
        city: "South Elvis",
        zipcode: "53919-4257",
        lat: "29.4572",
        lng: "-164.2990",
        phone: "493-170-9623 x156",
        website: "kale.biz",
        company: "Robel-Corkery",
        catch_phrase: "Multi-tiered zero tolerance productivity",
        bs: "transition cutting-edge web services",
    },
    SampleUser {
        id: 5,
        name: "Chelsey Dietrich",
        username: "Kamren",
        email: "Lucio_Hettinger@annie.ca",
        street: "Skiles Walks",
        suite: "Suite 351",
        city: "Roscoeview",
        zipcode: "33263",
        lat: "-31.8129",
        lng: "62.5342",
        phone: "(254)954-1289",
        website: "demarco.info",
        company: "Keebler LLC",
        catch_phrase: "User-centric fault-tolerant solution",
        bs: "revolutionize end-to-end systems",
    },
    SampleUser {
        id: 6,
        name: "Mrs. Dennis Schulist",
        username: "Leopoldo_Corkery",
        email: "Karley_Dach@jasper.info",
        street: "Norberto Crossing",
        suite: "Apt. 950",
        city: "South Christy",
        zipcode: "23505-1337",
        lat: "-71.4197",
        lng: "71.7478",
        phone: "1-477-935-8478 x6430",
        website: "ola.org",
        company: "Considine-Lockman",
        catch_phrase: "Synchronised bottom-line interface",
        bs: "e-enable innovative applications",
    },
    SampleUser {
        id: 7,
        name: "Kurtis Weissnat",
        username: "Elwyn.Skiles",
        email: "Telly.Hoeger@billy.biz",
        street: "Rex Trail",
        suite: "Suite 280",
        city: "Howemouth",
        zipcode: "58804-1099",
        lat: "24.8918",
        lng: "21.8984",
        phone: "210.067.6132",
        website: "elvis.io",
        company: "Johns Group",
        catch_phrase: "Configurable multimedia task-force",
        bs: "generate enterprise e-tailers",
    },
    SampleUser {
        id: 8,
        name: "Nicholas Runolfsdottir V",
        username: "Maxime_Nienow",
        email: "Sherwood@rosamond.me",
        street: "Ellsworth Summit",
        suite: "Suite 729",
        city: "Aliyaview",
        zipcode: "45169",
        lat: "-14.3990",
        lng: "-120.7677",
        phone: "586.493.6943 x140",
        website: "jacynthe.com",
        company: "Abernathy Group",
        catch_phrase: "Implemented secondary concept",
        bs: "e-enable extensible e-tailers",
    },
    SampleUser {
        id: 9,
        name: "Glenna Reichert",
        username: "Delphine",
        email: "Chaim_McDermott@dana.io",
        street: "Dayna Park",
        suite: "Suite 449",
        city: "Bartholomebury",
        zipcode: "76495-3109",
        lat: "24.6463",
        lng: "-168.8889",
        phone: "(775)976-6794 x41206",
        website: "conrad.com",
        company: "Yost and Sons",
        catch_phrase: "Switchable contextually-based project",
        bs: "aggregate real-time technologies",
    },
    SampleUser {
        id: 10,
        name: "Clementina DuBuque",
        username: "Moriah.Stanton",
        email: "Rey.Padberg@karina.biz",
        street: "Kattie Turnpike",
        suite: "Suite 198",
        city: "Lebsackbury",
        zipcode: "31428-2261",
        lat: "-38.2386",
        lng: "57.2232",
        phone: "024-648-3804",
        website: "ambrose.net",
        company: "Hoeger LLC",
        catch_phrase: "Centralized empowering task-force",
        bs: "target end-to-end models",
    },
];

/// Deterministic ten-user dataset
pub fn sample_records() -> Vec<Record> {
    SAMPLE_USERS.iter().map(Record::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_records_are_complete() {
        let records = sample_records();
        assert_eq!(records.len(), 10);

        for (index, record) in records.iter().enumerate() {
            assert_eq!(record.id, index as i64 + 1);
            assert!(record.validate().is_ok(), "record {} should be valid", record.id);
        }
    }

    #[tokio::test]
    async fn test_memory_source_load() {
        let source = MemorySource::new(vec![sample_records().remove(0)]);

        let records = source.load_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("Leanne Graham"));
        assert_eq!(source.describe(), "memory:1 records");
        assert_eq!(source.source_type(), SourceType::Memory);
    }
}
