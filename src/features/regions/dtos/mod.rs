pub mod region_dto;

pub use region_dto::{
    AdminUnitResponseDto, HealthResponseDto, ProvinceResponseDto, ReadinessResponseDto,
    SearchQuery,
};
