//! Serialized call service.
//!
//! The engine is owned by a single task that drains a bounded request queue
//! one call at a time; every call observes the state left by the previous one.
//! Callers hold cheap, cloneable [`AuctionHandle`]s and await a oneshot reply.

use alloy::primitives::{Address, Log};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use feeauction_common::error::AuctionError;
use feeauction_common::types::{AuctionState, Bid, ResourceConfig, ResourceId, TradeParams};

use crate::bid::BidOutcome;
use crate::custodian::Custodian;
use crate::engine::AuctionEngine;
use crate::fee::FeeDecision;
use crate::liquidation::Liquidation;
use crate::rent::Settlement;

type Reply<T> = oneshot::Sender<Result<T, AuctionError>>;

/// A queued call. `now` is the substrate's time for that call.
enum Request {
    Initialize {
        config: ResourceConfig,
        now: u64,
        reply: Reply<ResourceId>,
    },
    Deposit {
        resource: ResourceId,
        bidder: Address,
        amount: u128,
        now: u64,
        reply: Reply<u128>,
    },
    Withdraw {
        resource: ResourceId,
        bidder: Address,
        amount: u128,
        now: u64,
        reply: Reply<u128>,
    },
    ModifyBid {
        resource: ResourceId,
        bidder: Address,
        bid: Bid,
        now: u64,
        reply: Reply<BidOutcome>,
    },
    Liquidate {
        resource: ResourceId,
        now: u64,
        reply: Reply<Liquidation>,
    },
    Swap {
        resource: ResourceId,
        trade: TradeParams,
        now: u64,
        reply: Reply<FeeDecision>,
    },
    LiquidityChange {
        resource: ResourceId,
        adding: bool,
        now: u64,
        reply: Reply<Settlement>,
    },
    GetDeposit {
        resource: ResourceId,
        bidder: Address,
        reply: oneshot::Sender<u128>,
    },
    GetAuctionState {
        resource: ResourceId,
        reply: oneshot::Sender<AuctionState>,
    },
    Journal {
        reply: oneshot::Sender<Vec<Log>>,
    },
}

impl Request {
    fn name(&self) -> &'static str {
        match self {
            Request::Initialize { .. } => "initialize",
            Request::Deposit { .. } => "deposit",
            Request::Withdraw { .. } => "withdraw",
            Request::ModifyBid { .. } => "modify_bid",
            Request::Liquidate { .. } => "liquidate",
            Request::Swap { .. } => "swap",
            Request::LiquidityChange { .. } => "liquidity_change",
            Request::GetDeposit { .. } => "get_deposit",
            Request::GetAuctionState { .. } => "get_auction_state",
            Request::Journal { .. } => "journal",
        }
    }
}

/// Owns the engine and executes queued calls in arrival order.
pub struct AuctionService<C> {
    engine: AuctionEngine<C>,
    requests: mpsc::Receiver<Request>,
}

impl<C: Custodian + 'static> AuctionService<C> {
    /// Start the service on the current runtime.
    ///
    /// The task ends once every handle is dropped and hands the engine back.
    pub fn spawn(engine: AuctionEngine<C>) -> (AuctionHandle, JoinHandle<AuctionEngine<C>>) {
        let (sender, requests) = mpsc::channel(engine.params().service_queue_depth);
        let service = Self { engine, requests };
        let task = tokio::spawn(service.run());
        (AuctionHandle { sender }, task)
    }

    async fn run(mut self) -> AuctionEngine<C> {
        tracing::info!("Auction service started");
        while let Some(request) = self.requests.recv().await {
            self.handle(request);
        }
        tracing::info!("Auction service stopped");
        self.engine
    }

    fn handle(&mut self, request: Request) {
        let call = request.name();
        let engine = &mut self.engine;
        match request {
            Request::Initialize { config, now, reply } => {
                respond(call, reply, engine.initialize(config, now))
            }
            Request::Deposit {
                resource,
                bidder,
                amount,
                now,
                reply,
            } => respond(call, reply, engine.deposit(resource, bidder, amount, now)),
            Request::Withdraw {
                resource,
                bidder,
                amount,
                now,
                reply,
            } => respond(call, reply, engine.withdraw(resource, bidder, amount, now)),
            Request::ModifyBid {
                resource,
                bidder,
                bid,
                now,
                reply,
            } => respond(call, reply, engine.modify_bid(resource, bidder, bid, now)),
            Request::Liquidate {
                resource,
                now,
                reply,
            } => respond(call, reply, engine.liquidate(resource, now)),
            Request::Swap {
                resource,
                trade,
                now,
                reply,
            } => respond(call, reply, engine.before_swap(resource, &trade, now)),
            Request::LiquidityChange {
                resource,
                adding,
                now,
                reply,
            } => {
                let result = if adding {
                    engine.before_add_liquidity(resource, now)
                } else {
                    engine.before_remove_liquidity(resource, now)
                };
                respond(call, reply, result)
            }
            Request::GetDeposit {
                resource,
                bidder,
                reply,
            } => {
                let _ = reply.send(engine.get_deposit(resource, bidder));
            }
            Request::GetAuctionState { resource, reply } => {
                let _ = reply.send(engine.get_auction_state(resource));
            }
            Request::Journal { reply } => {
                let _ = reply.send(engine.journal().to_vec());
            }
        }
    }
}

fn respond<T>(call: &'static str, reply: Reply<T>, result: Result<T, AuctionError>) {
    if let Err(e) = &result {
        tracing::warn!(call, error = %e, "Call rejected");
    }
    // the caller may have stopped waiting; the call is committed either way
    let _ = reply.send(result);
}

/// Client side of the service queue.
#[derive(Debug, Clone)]
pub struct AuctionHandle {
    sender: mpsc::Sender<Request>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl AuctionHandle {
    async fn call<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> Request,
    ) -> Result<T, AuctionError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| AuctionError::ServiceUnavailable)?;
        response.await.map_err(|_| AuctionError::ServiceUnavailable)?
    }

    async fn query<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Request) -> Result<T, AuctionError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| AuctionError::ServiceUnavailable)?;
        response.await.map_err(|_| AuctionError::ServiceUnavailable)
    }

    pub async fn initialize(&self, config: ResourceConfig, now: u64) -> Result<ResourceId, AuctionError> {
        self.call(|reply| Request::Initialize { config, now, reply })
            .await
    }

    pub async fn deposit(
        &self,
        resource: ResourceId,
        bidder: Address,
        amount: u128,
        now: u64,
    ) -> Result<u128, AuctionError> {
        self.call(|reply| Request::Deposit {
            resource,
            bidder,
            amount,
            now,
            reply,
        })
        .await
    }

    pub async fn withdraw(
        &self,
        resource: ResourceId,
        bidder: Address,
        amount: u128,
        now: u64,
    ) -> Result<u128, AuctionError> {
        self.call(|reply| Request::Withdraw {
            resource,
            bidder,
            amount,
            now,
            reply,
        })
        .await
    }

    pub async fn modify_bid(
        &self,
        resource: ResourceId,
        bidder: Address,
        bid: Bid,
        now: u64,
    ) -> Result<BidOutcome, AuctionError> {
        self.call(|reply| Request::ModifyBid {
            resource,
            bidder,
            bid,
            now,
            reply,
        })
        .await
    }

    pub async fn liquidate(&self, resource: ResourceId, now: u64) -> Result<Liquidation, AuctionError> {
        self.call(|reply| Request::Liquidate {
            resource,
            now,
            reply,
        })
        .await
    }

    pub async fn before_swap(
        &self,
        resource: ResourceId,
        trade: TradeParams,
        now: u64,
    ) -> Result<FeeDecision, AuctionError> {
        self.call(|reply| Request::Swap {
            resource,
            trade,
            now,
            reply,
        })
        .await
    }

    pub async fn before_add_liquidity(&self, resource: ResourceId, now: u64) -> Result<Settlement, AuctionError> {
        self.call(|reply| Request::LiquidityChange {
            resource,
            adding: true,
            now,
            reply,
        })
        .await
    }

    pub async fn before_remove_liquidity(
        &self,
        resource: ResourceId,
        now: u64,
    ) -> Result<Settlement, AuctionError> {
        self.call(|reply| Request::LiquidityChange {
            resource,
            adding: false,
            now,
            reply,
        })
        .await
    }

    pub async fn get_deposit(&self, resource: ResourceId, bidder: Address) -> Result<u128, AuctionError> {
        self.query(|reply| Request::GetDeposit {
            resource,
            bidder,
            reply,
        })
        .await
    }

    pub async fn get_auction_state(&self, resource: ResourceId) -> Result<AuctionState, AuctionError> {
        self.query(|reply| Request::GetAuctionState { resource, reply })
            .await
    }

    /// Snapshot of the committed journal.
    pub async fn journal(&self) -> Result<Vec<Log>, AuctionError> {
        self.query(|reply| Request::Journal { reply }).await
    }
}
